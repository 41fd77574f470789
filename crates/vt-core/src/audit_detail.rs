//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `detail` JSON blob. These types
//! fix the shape of the details written by the workflow rules.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Detail for `AuditAction::StatusChanged` on a movement's final status.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: Option<String>,
    pub to: String,
    /// Which rule derived the change, e.g. `review_not_ok`.
    pub rule: String,
}

/// Detail for `AuditAction::AutoCreated`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AutoCreatedDetail {
    pub rule: String,
}

/// Detail for `AuditAction::Closed`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ClosedDetail {
    pub exit_date: NaiveDate,
    pub previous_exit_date: Option<NaiveDate>,
}

/// Detail for `AuditAction::Deleted` on a movement aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DeletedDetail {
    pub stage_records: u64,
}
