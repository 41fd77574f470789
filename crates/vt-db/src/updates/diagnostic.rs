//! Diagnostic update builder.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_plate_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_code: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_fault: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_connected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Option<String>>,
}

impl DiagnosticUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.initial_plate_id.is_none()
            && self.fault_code.is_none()
            && self.has_fault.is_none()
            && self.is_connected.is_none()
            && self.connection_time.is_none()
            && self.note.is_none()
    }
}

#[derive(Debug, Default)]
pub struct DiagnosticUpdateBuilder(DiagnosticUpdate);

impl DiagnosticUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn initial_plate_id(mut self, plate: Option<String>) -> Self {
        self.0.initial_plate_id = Some(plate);
        self
    }

    #[must_use]
    pub fn fault_code(mut self, code: Option<String>) -> Self {
        self.0.fault_code = Some(code);
        self
    }

    #[must_use]
    pub fn has_fault(mut self, has_fault: bool) -> Self {
        self.0.has_fault = Some(has_fault);
        self
    }

    #[must_use]
    pub fn is_connected(mut self, is_connected: bool) -> Self {
        self.0.is_connected = Some(is_connected);
        self
    }

    #[must_use]
    pub fn connection_time(mut self, at: DateTime<Utc>) -> Self {
        self.0.connection_time = Some(at);
        self
    }

    #[must_use]
    pub fn note(mut self, note: Option<String>) -> Self {
        self.0.note = Some(note);
        self
    }

    #[must_use]
    pub fn build(self) -> DiagnosticUpdate {
        self.0
    }
}
