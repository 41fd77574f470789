use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::StageStatus;

/// Final technician work on a validator before it leaves.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Preparation {
    pub id: String,
    pub movement_id: String,
    pub technician_id: Option<String>,
    pub status: StageStatus,
    pub plate_changed: bool,
    pub detail: Option<String>,
    /// Required when `plate_changed` is true.
    pub final_plate_id: Option<String>,
    pub prepared_on: Option<NaiveDate>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
