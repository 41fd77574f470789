//! Movement update builder.
//!
//! Exit date and final status are not here: closing has its own operation and
//! the final status is only ever derived.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct MovementUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intake_date: Option<NaiveDate>,
    /// Shipment type catalog label, `Some(None)` clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment_type: Option<Option<String>>,
}

impl MovementUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.intake_date.is_none() && self.shipment_type.is_none()
    }
}

#[derive(Debug, Default)]
pub struct MovementUpdateBuilder(MovementUpdate);

impl MovementUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn intake_date(mut self, date: NaiveDate) -> Self {
        self.0.intake_date = Some(date);
        self
    }

    #[must_use]
    pub fn shipment_type(mut self, shipment_type: Option<String>) -> Self {
        self.0.shipment_type = Some(shipment_type);
        self
    }

    #[must_use]
    pub fn build(self) -> MovementUpdate {
        self.0
    }
}
