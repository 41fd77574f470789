use chrono::NaiveDate;
use clap::Subcommand;

/// Movement entity commands.
#[derive(Clone, Debug, Subcommand)]
pub enum MovementCommands {
    /// Open a movement and create its intake stages.
    Open {
        validator_id: String,
        /// field, warranty or new
        #[arg(long)]
        origin: String,
        /// Defaults to the processing date.
        #[arg(long)]
        intake_date: Option<NaiveDate>,
    },
    /// Get a movement by ID.
    Get { id: String },
    /// List movements.
    List {
        #[arg(long)]
        validator: Option<String>,
        /// open or closed, as of the processing date
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Update the intake date or shipment type of an open movement.
    Update {
        id: String,
        #[arg(long)]
        intake_date: Option<NaiveDate>,
        #[arg(long, conflicts_with = "clear_shipment_type")]
        shipment_type: Option<String>,
        #[arg(long)]
        clear_shipment_type: bool,
    },
    /// Set the exit date of a movement.
    Close {
        id: String,
        /// Defaults to the processing date.
        #[arg(long)]
        exit_date: Option<NaiveDate>,
    },
    /// Delete a movement and its stage records.
    Delete { id: String },
    /// Audit trail of a movement and its stages, newest first.
    History {
        id: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Movement with its state and all stage records.
    Stages { id: String },
}
