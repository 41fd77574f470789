use chrono::NaiveDate;
use vt_core::enums::StageStatus;
use vt_db::updates::{ReviewUpdate, ReviewUpdateBuilder};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ReviewCommands;
use crate::commands::shared::parse::{optional_text, parse_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `vt review`.
pub async fn handle(
    action: &ReviewCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ReviewCommands::Record {
            movement_id,
            verdict,
            pending_transaction,
            assigned_plate,
            note,
            reviewed_on,
            create,
        } => {
            let update = build_update(
                verdict.as_deref(),
                *pending_transaction,
                assigned_plate.as_deref(),
                note.as_deref(),
                *reviewed_on,
            )?;
            let review = if *create {
                ctx.service
                    .insert_review(ctx.actor(), movement_id, update)
                    .await?
            } else {
                ctx.service
                    .record_review(ctx.actor(), movement_id, update)
                    .await?
            };
            output(&review, flags.format)
        }
        ReviewCommands::Get { movement_id } => {
            output(&ctx.service.get_review(movement_id).await?, flags.format)
        }
    }
}

fn build_update(
    verdict: Option<&str>,
    pending_transaction: Option<bool>,
    assigned_plate: Option<&str>,
    note: Option<&str>,
    reviewed_on: Option<NaiveDate>,
) -> anyhow::Result<ReviewUpdate> {
    let mut builder = ReviewUpdateBuilder::new();
    if let Some(verdict) = verdict {
        builder = builder.verdict(parse_enum::<StageStatus>(verdict, "verdict")?);
    }
    if let Some(pending) = pending_transaction {
        builder = builder.pending_transaction(pending);
    }
    if let Some(plate) = assigned_plate {
        builder = builder.assigned_plate_id(optional_text(plate));
    }
    if let Some(note) = note {
        builder = builder.note(optional_text(note));
    }
    if let Some(date) = reviewed_on {
        builder = builder.reviewed_on(Some(date));
    }
    Ok(builder.build())
}
