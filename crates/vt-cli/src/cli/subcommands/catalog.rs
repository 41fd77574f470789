use clap::Subcommand;

/// Catalog commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CatalogCommands {
    /// List catalog entries, optionally of one kind.
    List {
        /// origin, status, shipment_type, area_type or role
        #[arg(long)]
        kind: Option<String>,
    },
}
