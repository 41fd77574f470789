use chrono::NaiveDate;
use vt_core::enums::StageStatus;
use vt_db::updates::{PreparationUpdate, PreparationUpdateBuilder};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::PreparationCommands;
use crate::commands::shared::parse::{optional_text, parse_enum};
use crate::context::AppContext;
use crate::output::output;

struct PreparationArgs<'a> {
    status: Option<&'a str>,
    technician: Option<&'a str>,
    plate_changed: Option<bool>,
    final_plate: Option<&'a str>,
    detail: Option<&'a str>,
    prepared_on: Option<NaiveDate>,
}

/// Handle `vt preparation`.
pub async fn handle(
    action: &PreparationCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        PreparationCommands::Record {
            movement_id,
            status,
            technician,
            plate_changed,
            final_plate,
            detail,
            prepared_on,
            create,
        } => {
            let update = build_update(&PreparationArgs {
                status: status.as_deref(),
                technician: technician.as_deref(),
                plate_changed: *plate_changed,
                final_plate: final_plate.as_deref(),
                detail: detail.as_deref(),
                prepared_on: *prepared_on,
            })?;
            let preparation = if *create {
                ctx.service
                    .insert_preparation(ctx.actor(), movement_id, update)
                    .await?
            } else {
                ctx.service
                    .record_preparation(ctx.actor(), movement_id, update)
                    .await?
            };
            output(&preparation, flags.format)
        }
        PreparationCommands::Get { movement_id } => {
            output(&ctx.service.get_preparation(movement_id).await?, flags.format)
        }
    }
}

fn build_update(args: &PreparationArgs<'_>) -> anyhow::Result<PreparationUpdate> {
    let mut builder = PreparationUpdateBuilder::new();
    if let Some(status) = args.status {
        builder = builder.status(parse_enum::<StageStatus>(status, "status")?);
    }
    if let Some(technician) = args.technician {
        builder = builder.technician_id(optional_text(technician));
    }
    if let Some(changed) = args.plate_changed {
        builder = builder.plate_changed(changed);
    }
    if let Some(plate) = args.final_plate {
        builder = builder.final_plate_id(optional_text(plate));
    }
    if let Some(detail) = args.detail {
        builder = builder.detail(optional_text(detail));
    }
    if let Some(date) = args.prepared_on {
        builder = builder.prepared_on(Some(date));
    }
    Ok(builder.build())
}
