use vt_db::updates::DiagnosticUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::DiagnosticCommands;
use crate::commands::shared::parse::optional_text;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vt diagnostic`.
pub async fn handle(
    action: &DiagnosticCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        DiagnosticCommands::Record {
            movement_id,
            initial_plate,
            fault_code,
            has_fault,
            connected,
            connection_time,
            note,
        } => {
            let mut builder = DiagnosticUpdateBuilder::new();
            if let Some(plate) = initial_plate {
                builder = builder.initial_plate_id(optional_text(plate));
            }
            if let Some(code) = fault_code {
                builder = builder.fault_code(optional_text(code));
            }
            if let Some(has_fault) = has_fault {
                builder = builder.has_fault(*has_fault);
            }
            if let Some(connected) = connected {
                builder = builder.is_connected(*connected);
            }
            if let Some(at) = connection_time {
                builder = builder.connection_time(*at);
            }
            if let Some(note) = note {
                builder = builder.note(optional_text(note));
            }

            let diagnostic = ctx
                .service
                .record_diagnostic(ctx.actor(), movement_id, builder.build())
                .await?;
            output(&diagnostic, flags.format)
        }
        DiagnosticCommands::Get { movement_id } => {
            output(&ctx.service.get_diagnostic(movement_id).await?, flags.format)
        }
    }
}
