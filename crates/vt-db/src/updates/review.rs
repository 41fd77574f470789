//! Supervisor review update builder.

use chrono::NaiveDate;
use serde::Serialize;
use vt_core::enums::StageStatus;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReviewUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_transaction: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_plate_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<StageStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_on: Option<Option<NaiveDate>>,
}

impl ReviewUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pending_transaction.is_none()
            && self.assigned_plate_id.is_none()
            && self.verdict.is_none()
            && self.note.is_none()
            && self.reviewed_on.is_none()
    }
}

#[derive(Debug, Default)]
pub struct ReviewUpdateBuilder(ReviewUpdate);

impl ReviewUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending_transaction(mut self, pending: bool) -> Self {
        self.0.pending_transaction = Some(pending);
        self
    }

    #[must_use]
    pub fn assigned_plate_id(mut self, plate: Option<String>) -> Self {
        self.0.assigned_plate_id = Some(plate);
        self
    }

    #[must_use]
    pub fn verdict(mut self, verdict: StageStatus) -> Self {
        self.0.verdict = Some(verdict);
        self
    }

    #[must_use]
    pub fn note(mut self, note: Option<String>) -> Self {
        self.0.note = Some(note);
        self
    }

    #[must_use]
    pub fn reviewed_on(mut self, date: Option<NaiveDate>) -> Self {
        self.0.reviewed_on = Some(date);
        self
    }

    #[must_use]
    pub fn build(self) -> ReviewUpdate {
        self.0
    }
}
