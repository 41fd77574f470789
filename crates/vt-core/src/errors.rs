//! Workflow error taxonomy.
//!
//! Every rule rejection is a distinct variant so callers can react to it
//! without string matching. Storage faults live in `vt_db::error::DatabaseError`,
//! which wraps this type.

use chrono::NaiveDate;
use thiserror::Error;

use crate::enums::{CatalogKind, EntityType, Origin, StageStatus};

/// Rejections raised by the movement workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// A catalog name the workflow needs is not present in the catalog table.
    #[error("Catalog {kind} entry '{name}' could not be resolved")]
    Configuration { kind: CatalogKind, name: String },

    /// A diagnostic or review write targets a movement whose origin has no such stage.
    #[error("{stage} records are only kept for field movements; movement {movement_id} is {origin}")]
    GuardViolation {
        stage: EntityType,
        movement_id: String,
        origin: Origin,
    },

    /// A preparation insert on a field movement without an OK review.
    #[error(
        "Preparation for movement {movement_id} requires an OK review (current verdict: {})",
        verdict.map_or("none", StageStatus::as_str)
    )]
    GateViolation {
        movement_id: String,
        verdict: Option<StageStatus>,
    },

    /// A second review or preparation insert for the same movement.
    #[error("Movement {movement_id} already has a {stage} record")]
    DuplicateStage {
        stage: EntityType,
        movement_id: String,
    },

    /// A record breaks a structural rule (e.g. plate change without a final plate).
    #[error("Structural invariant violated: {0}")]
    StructuralInvariant(String),

    /// The movement's exit date has been reached; it and its stages are frozen.
    #[error("Movement {movement_id} is closed since {exit_date}; edits are locked")]
    EditLocked {
        movement_id: String,
        exit_date: NaiveDate,
    },

    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: EntityType, id: String },
}

impl WorkflowError {
    /// True when the caller must re-read current state before any retry.
    #[must_use]
    pub const fn requires_reread(&self) -> bool {
        matches!(self, Self::DuplicateStage { .. })
    }

    /// Short stable code for logs and CLI exit reporting.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::GuardViolation { .. } => "guard_violation",
            Self::GateViolation { .. } => "gate_violation",
            Self::DuplicateStage { .. } => "duplicate_stage",
            Self::StructuralInvariant(_) => "structural_invariant",
            Self::EditLocked { .. } => "edit_locked",
            Self::NotFound { .. } => "not_found",
        }
    }

    #[must_use]
    pub fn not_found(entity_type: EntityType, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_message_names_verdict() {
        let err = WorkflowError::GateViolation {
            movement_id: "mov-1".into(),
            verdict: Some(StageStatus::NotOk),
        };
        assert!(err.to_string().contains("not_ok"));

        let err = WorkflowError::GateViolation {
            movement_id: "mov-1".into(),
            verdict: None,
        };
        assert!(err.to_string().contains("none"));
    }

    #[test]
    fn only_duplicates_require_reread() {
        let dup = WorkflowError::DuplicateStage {
            stage: EntityType::Review,
            movement_id: "mov-1".into(),
        };
        assert!(dup.requires_reread());
        assert!(!WorkflowError::not_found(EntityType::Movement, "mov-1").requires_reread());
        assert_eq!(dup.code(), "duplicate_stage");
    }
}
