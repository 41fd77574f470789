use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    CatalogCommands, DiagnosticCommands, MovementCommands, PreparationCommands, ReviewCommands,
    ValidatorCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Catalog labels (origins, statuses, shipment types).
    Catalog {
        #[command(subcommand)]
        action: CatalogCommands,
    },
    /// Validator devices.
    Validator {
        #[command(subcommand)]
        action: ValidatorCommands,
    },
    /// Movements: one intake-to-exit pass of a validator through the workshop.
    Movement {
        #[command(subcommand)]
        action: MovementCommands,
    },
    /// Technician diagnostic of a field intake.
    Diagnostic {
        #[command(subcommand)]
        action: DiagnosticCommands,
    },
    /// Supervisor review.
    Review {
        #[command(subcommand)]
        action: ReviewCommands,
    },
    /// Preparation for dispatch.
    Preparation {
        #[command(subcommand)]
        action: PreparationCommands,
    },
    /// Print the JSON Schema of an entity type.
    Schema(SchemaArgs),
}

/// Arguments for `vt schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    pub type_name: String,
}
