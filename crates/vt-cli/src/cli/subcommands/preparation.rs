use chrono::NaiveDate;
use clap::Subcommand;

/// Preparation stage commands.
#[derive(Clone, Debug, Subcommand)]
pub enum PreparationCommands {
    /// Create or update the preparation of a movement.
    Record {
        movement_id: String,
        /// pending, ok or not_ok
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        technician: Option<String>,
        #[arg(long)]
        plate_changed: Option<bool>,
        #[arg(long)]
        final_plate: Option<String>,
        #[arg(long)]
        detail: Option<String>,
        #[arg(long)]
        prepared_on: Option<NaiveDate>,
        /// Fail if the preparation already exists instead of updating it.
        #[arg(long)]
        create: bool,
    },
    /// Get the preparation of a movement.
    Get { movement_id: String },
}
