mod close;
mod history;
mod list;
mod open;
mod update;

use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::MovementCommands;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct DeleteResponse<'a> {
    id: &'a str,
    deleted: bool,
    stage_records: u64,
}

/// Handle `vt movement`.
pub async fn handle(
    action: &MovementCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        MovementCommands::Open {
            validator_id,
            origin,
            intake_date,
        } => open::run(validator_id, origin, *intake_date, ctx, flags).await,
        MovementCommands::Get { id } => output(&ctx.service.get_movement(id).await?, flags.format),
        MovementCommands::List {
            validator,
            state,
            limit,
        } => list::run(validator.as_deref(), state.as_deref(), *limit, ctx, flags).await,
        MovementCommands::Update {
            id,
            intake_date,
            shipment_type,
            clear_shipment_type,
        } => {
            update::run(
                id,
                *intake_date,
                shipment_type.as_deref(),
                *clear_shipment_type,
                ctx,
                flags,
            )
            .await
        }
        MovementCommands::Close { id, exit_date } => close::run(id, *exit_date, ctx, flags).await,
        MovementCommands::Delete { id } => {
            let stage_records = ctx.service.delete_movement(ctx.actor(), id).await?;
            output(
                &DeleteResponse {
                    id,
                    deleted: true,
                    stage_records,
                },
                flags.format,
            )
        }
        MovementCommands::History { id, limit } => history::run(id, *limit, ctx, flags).await,
        MovementCommands::Stages { id } => {
            output(&ctx.service.get_movement_stages(id).await?, flags.format)
        }
    }
}
