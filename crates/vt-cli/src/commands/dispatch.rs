use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Catalog { action } => commands::catalog::handle(&action, ctx, flags).await,
        Commands::Validator { action } => commands::validator::handle(&action, ctx, flags).await,
        Commands::Movement { action } => commands::movement::handle(&action, ctx, flags).await,
        Commands::Diagnostic { action } => commands::diagnostic::handle(&action, ctx, flags).await,
        Commands::Review { action } => commands::review::handle(&action, ctx, flags).await,
        Commands::Preparation { action } => {
            commands::preparation::handle(&action, ctx, flags).await
        }
        Commands::Schema(_) => unreachable!("schema is pre-dispatched in main"),
    }
}
