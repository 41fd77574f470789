use serde::Serialize;
use vt_core::entities::Movement;
use vt_core::enums::MovementState;
use vt_db::repos::movement::MovementFilter;

use crate::cli::GlobalFlags;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct MovementListResponse {
    movements: Vec<Movement>,
}

pub async fn run(
    validator: Option<&str>,
    state: Option<&str>,
    limit: Option<u32>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = MovementFilter {
        validator_id: validator.map(String::from),
        state: state
            .map(|value| parse_enum::<MovementState>(value, "state"))
            .transpose()?,
        limit: Some(effective_limit(limit, flags.limit, ctx.default_limit())),
    };

    let movements = ctx.service.list_movements(&filter).await?;
    output(&MovementListResponse { movements }, flags.format)
}
