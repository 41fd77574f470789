use serde::Serialize;
use vt_core::entities::CatalogEntry;
use vt_core::enums::CatalogKind;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::CatalogCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct CatalogListResponse {
    entries: Vec<CatalogEntry>,
}

/// Handle `vt catalog`.
pub async fn handle(
    action: &CatalogCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        CatalogCommands::List { kind } => {
            let kind = kind
                .as_deref()
                .map(|value| parse_enum::<CatalogKind>(value, "kind"))
                .transpose()?;
            let entries = ctx.service.list_catalog(kind).await?;
            output(&CatalogListResponse { entries }, flags.format)
        }
    }
}
