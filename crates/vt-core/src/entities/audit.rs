use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AuditAction, EntityType};

/// An append-only audit trail entry recording a mutation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: String,
    /// Acting user, or `None` for rule-driven writes without a caller identity.
    pub actor: Option<String>,
    pub entity_type: EntityType,
    pub entity_id: String,
    /// Owning movement, for history queries.
    pub movement_id: Option<String>,
    pub action: AuditAction,
    pub detail: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
