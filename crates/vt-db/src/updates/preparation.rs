//! Preparation update builder.

use chrono::NaiveDate;
use serde::Serialize;
use vt_core::enums::StageStatus;

#[derive(Debug, Clone, Default, Serialize)]
pub struct PreparationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technician_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StageStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate_changed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_plate_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepared_on: Option<Option<NaiveDate>>,
}

impl PreparationUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.technician_id.is_none()
            && self.status.is_none()
            && self.plate_changed.is_none()
            && self.detail.is_none()
            && self.final_plate_id.is_none()
            && self.prepared_on.is_none()
    }
}

#[derive(Debug, Default)]
pub struct PreparationUpdateBuilder(PreparationUpdate);

impl PreparationUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn technician_id(mut self, technician: Option<String>) -> Self {
        self.0.technician_id = Some(technician);
        self
    }

    #[must_use]
    pub fn status(mut self, status: StageStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn plate_changed(mut self, changed: bool) -> Self {
        self.0.plate_changed = Some(changed);
        self
    }

    #[must_use]
    pub fn detail(mut self, detail: Option<String>) -> Self {
        self.0.detail = Some(detail);
        self
    }

    #[must_use]
    pub fn final_plate_id(mut self, plate: Option<String>) -> Self {
        self.0.final_plate_id = Some(plate);
        self
    }

    #[must_use]
    pub fn prepared_on(mut self, date: Option<NaiveDate>) -> Self {
        self.0.prepared_on = Some(date);
        self
    }

    #[must_use]
    pub fn build(self) -> PreparationUpdate {
        self.0
    }
}
