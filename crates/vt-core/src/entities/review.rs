use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::StageStatus;

/// Supervisor verdict over a field diagnosis. Exactly one per field movement.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SupervisorReview {
    pub id: String,
    pub movement_id: String,
    pub pending_transaction: bool,
    pub assigned_plate_id: Option<String>,
    pub verdict: StageStatus,
    pub note: Option<String>,
    pub reviewed_on: Option<NaiveDate>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
