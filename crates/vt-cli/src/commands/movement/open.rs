use chrono::NaiveDate;
use vt_core::enums::Origin;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    validator_id: &str,
    origin: &str,
    intake_date: Option<NaiveDate>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let origin = parse_enum::<Origin>(origin, "origin")?;
    let intake_date = intake_date.unwrap_or_else(|| ctx.service.today());

    let stages = ctx
        .service
        .open_movement(ctx.actor(), validator_id, intake_date, origin)
        .await?;
    output(&stages, flags.format)
}
