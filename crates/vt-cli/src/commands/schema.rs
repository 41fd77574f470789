use schemars::{JsonSchema, Schema, schema_for};
use vt_core::entities::{
    AuditEntry, CatalogEntry, Diagnostic, Movement, MovementStages, Preparation,
    SupervisorReview, Validator,
};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

const TYPE_NAMES: [&str; 8] = [
    "validator",
    "movement",
    "movement_stages",
    "diagnostic",
    "review",
    "preparation",
    "audit_entry",
    "catalog_entry",
];

/// Handle `vt schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = schema_by_name(&args.type_name)?;
    output(&schema, flags.format)
}

fn schema_by_name(type_name: &str) -> anyhow::Result<Schema> {
    let normalized = type_name.trim().to_ascii_lowercase().replace('-', "_");
    let schema = match normalized.as_str() {
        "validator" => generate::<Validator>(),
        "movement" => generate::<Movement>(),
        "movement_stages" | "stages" => generate::<MovementStages>(),
        "diagnostic" => generate::<Diagnostic>(),
        "review" | "supervisor_review" => generate::<SupervisorReview>(),
        "preparation" => generate::<Preparation>(),
        "audit_entry" | "audit" => generate::<AuditEntry>(),
        "catalog_entry" | "catalog" => generate::<CatalogEntry>(),
        _ => anyhow::bail!(
            "unknown schema type '{type_name}' (expected one of: {})",
            TYPE_NAMES.join(", ")
        ),
    };
    Ok(schema)
}

fn generate<T: JsonSchema>() -> Schema {
    schema_for!(T)
}
