use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Field diagnosis of a validator. Field-origin movements only.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Diagnostic {
    pub id: String,
    pub movement_id: String,
    pub initial_plate_id: Option<String>,
    pub fault_code: Option<String>,
    pub has_fault: Option<bool>,
    pub is_connected: Option<bool>,
    pub connection_time: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Diagnostic {
    /// Both the fault flag and the connectivity flag have been recorded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.has_fault.is_some() && self.is_connected.is_some()
    }
}
