use clap::Subcommand;

/// Validator entity commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ValidatorCommands {
    /// Register a validator device.
    Add {
        hardware_id: String,
        #[arg(long = "type", default_value = "bus")]
        validator_type: String,
    },
    /// Get a validator by ID, or by hardware ID with `--hardware`.
    Get {
        id: String,
        #[arg(long)]
        hardware: bool,
    },
    /// List validators.
    List {
        #[arg(long)]
        limit: Option<u32>,
    },
}
