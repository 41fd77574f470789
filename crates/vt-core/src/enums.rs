//! Origins, stage statuses, final statuses, entity types and actions.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! The string forms returned by `as_str()` are the canonical identifiers used in
//! audit rows and CLI arguments. Catalog *names* (the human-readable labels stored
//! in the `catalog` table) are configured separately and resolved once at startup.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// Why a movement was opened. Determines which stage records it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Pulled from the field; needs diagnosis and supervisor review.
    Field,
    Warranty,
    New,
}

impl Origin {
    pub const ALL: [Self; 3] = [Self::Field, Self::Warranty, Self::New];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Warranty => "warranty",
            Self::New => "new",
        }
    }

    /// Only field movements carry a diagnostic and a supervisor review.
    #[must_use]
    pub const fn requires_review(self) -> bool {
        matches!(self, Self::Field)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StageStatus
// ---------------------------------------------------------------------------

/// Outcome recorded on a supervisor review (the verdict) or a preparation.
///
/// ```text
/// pending → ok
///         → not_ok
/// ```
///
/// Stage records may be re-recorded while the movement is open, so every
/// status can follow every other one; the edit lock is what freezes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Ok,
    NotOk,
}

impl StageStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Ok, Self::NotOk];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ok => "ok",
            Self::NotOk => "not_ok",
        }
    }

    #[must_use]
    pub const fn is_decided(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FinalStatus
// ---------------------------------------------------------------------------

/// Terminal operational classification of a movement. Only ever written by
/// the workflow rules, never by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    Operational,
    NotOperational,
}

impl FinalStatus {
    pub const ALL: [Self; 2] = [Self::Operational, Self::NotOperational];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::NotOperational => "not_operational",
        }
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MovementState
// ---------------------------------------------------------------------------

/// Edit-lock state of a movement, derived from its exit date.
///
/// ```text
/// open → closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MovementState {
    Open,
    Closed,
}

impl MovementState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for MovementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CatalogKind
// ---------------------------------------------------------------------------

/// Named enumerations held in the `catalog` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Origin,
    Status,
    ShipmentType,
    AreaType,
    Role,
}

impl CatalogKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Status => "status",
            Self::ShipmentType => "shipment_type",
            Self::AreaType => "area_type",
            Self::Role => "role",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    /// A stage record created by a workflow rule rather than a caller.
    AutoCreated,
    Updated,
    StatusChanged,
    Closed,
    Deleted,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::AutoCreated => "auto_created",
            Self::Updated => "updated",
            Self::StatusChanged => "status_changed",
            Self::Closed => "closed",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of entity in the system, used in the audit trail and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Validator,
    Movement,
    Diagnostic,
    Review,
    Preparation,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validator => "validator",
            Self::Movement => "movement",
            Self::Diagnostic => "diagnostic",
            Self::Review => "review",
            Self::Preparation => "preparation",
        }
    }

    /// Whether this entity is a stage record owned by a movement.
    #[must_use]
    pub const fn is_stage(self) -> bool {
        matches!(self, Self::Diagnostic | Self::Review | Self::Preparation)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
