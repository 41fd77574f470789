use chrono::{DateTime, Utc};
use clap::Subcommand;

/// Diagnostic stage commands.
#[derive(Clone, Debug, Subcommand)]
pub enum DiagnosticCommands {
    /// Create or update the diagnostic of a field movement.
    Record {
        movement_id: String,
        #[arg(long)]
        initial_plate: Option<String>,
        #[arg(long)]
        fault_code: Option<String>,
        #[arg(long)]
        has_fault: Option<bool>,
        #[arg(long)]
        connected: Option<bool>,
        /// RFC 3339 timestamp
        #[arg(long)]
        connection_time: Option<DateTime<Utc>>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Get the diagnostic of a movement.
    Get { movement_id: String },
}
