use chrono::NaiveDate;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    id: &str,
    exit_date: Option<NaiveDate>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let exit_date = exit_date.unwrap_or_else(|| ctx.service.today());
    let movement = ctx.service.close_movement(ctx.actor(), id, exit_date).await?;
    output(&movement, flags.format)
}
