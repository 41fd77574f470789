use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A physical validator device. Immutable once registered.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Validator {
    pub id: String,
    /// Unique hardware serial.
    pub hardware_id: String,
    pub validator_type: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}
