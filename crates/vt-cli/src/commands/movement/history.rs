use vt_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

/// Audit entries for the movement row and its stage rows, newest first.
pub async fn run(
    id: &str,
    limit: Option<u32>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = AuditFilter {
        movement_id: Some(id.to_string()),
        limit: Some(effective_limit(limit, flags.limit, 100)),
        ..AuditFilter::default()
    };

    let entries = ctx.service.query_audit(&filter).await?;
    // Deleted movements keep their history; an unknown ID has none.
    if entries.is_empty() {
        ctx.service.get_movement(id).await?;
    }
    output(&entries, flags.format)
}
