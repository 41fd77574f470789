use serde::Serialize;
use vt_core::entities::Validator;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ValidatorCommands;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ValidatorListResponse {
    validators: Vec<Validator>,
}

/// Handle `vt validator`.
pub async fn handle(
    action: &ValidatorCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ValidatorCommands::Add {
            hardware_id,
            validator_type,
        } => {
            let validator = ctx
                .service
                .create_validator(ctx.actor(), hardware_id, validator_type)
                .await?;
            output(&validator, flags.format)
        }
        ValidatorCommands::Get { id, hardware } => {
            let validator = if *hardware {
                ctx.service.get_validator_by_hardware_id(id).await?
            } else {
                ctx.service.get_validator(id).await?
            };
            output(&validator, flags.format)
        }
        ValidatorCommands::List { limit } => {
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            let validators = ctx.service.list_validators(limit).await?;
            output(&ValidatorListResponse { validators }, flags.format)
        }
    }
}
