use chrono::NaiveDate;
use clap::Subcommand;

/// Supervisor review commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ReviewCommands {
    /// Create or update the supervisor review of a movement.
    Record {
        movement_id: String,
        /// pending, ok or not_ok
        #[arg(long)]
        verdict: Option<String>,
        #[arg(long)]
        pending_transaction: Option<bool>,
        #[arg(long)]
        assigned_plate: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        reviewed_on: Option<NaiveDate>,
        /// Fail if the review already exists instead of updating it.
        #[arg(long)]
        create: bool,
    },
    /// Get the supervisor review of a movement.
    Get { movement_id: String },
}
