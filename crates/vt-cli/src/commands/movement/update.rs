use chrono::NaiveDate;
use vt_db::updates::{MovementUpdate, MovementUpdateBuilder};

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::optional_text;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    id: &str,
    intake_date: Option<NaiveDate>,
    shipment_type: Option<&str>,
    clear_shipment_type: bool,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let update = build_update(intake_date, shipment_type, clear_shipment_type);
    if update.is_empty() {
        anyhow::bail!(
            "At least one of --intake-date, --shipment-type, or --clear-shipment-type must be provided"
        );
    }

    let movement = ctx.service.update_movement(ctx.actor(), id, update).await?;
    output(&movement, flags.format)
}

fn build_update(
    intake_date: Option<NaiveDate>,
    shipment_type: Option<&str>,
    clear_shipment_type: bool,
) -> MovementUpdate {
    let mut builder = MovementUpdateBuilder::new();
    if let Some(date) = intake_date {
        builder = builder.intake_date(date);
    }
    if clear_shipment_type {
        builder = builder.shipment_type(None);
    } else if let Some(name) = shipment_type {
        builder = builder.shipment_type(optional_text(name));
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::build_update;

    #[test]
    fn clear_flag_sets_explicit_none() {
        let update = build_update(None, None, true);
        assert_eq!(update.shipment_type, Some(None));
        assert!(!update.is_empty());
    }

    #[test]
    fn no_flags_build_an_empty_update() {
        assert!(build_update(None, None, false).is_empty());
    }

    #[test]
    fn shipment_type_is_trimmed() {
        let update = build_update(None, Some(" Despacho "), false);
        assert_eq!(update.shipment_type, Some(Some(String::from("Despacho"))));
    }
}
