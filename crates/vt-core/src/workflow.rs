//! Movement workflow rules.
//!
//! Pure decision functions with no I/O. `vt-db` calls them inside the
//! transaction of every write, in this order:
//!
//! ```text
//! check_edit_lock → check_stage_origin → check_preparation_gate
//!   → check_plate_invariant → write → review_outcome / preparation_outcome
//! ```
//!
//! Keeping the decisions here lets each rule be tested without a database.

use chrono::NaiveDate;

use crate::entities::Movement;
use crate::enums::{EntityType, FinalStatus, MovementState, Origin, StageStatus};
use crate::errors::WorkflowError;

/// Note stamped on the review created at field intake.
pub const FIELD_INTAKE_REVIEW_NOTE: &str = "auto-created on field intake";

/// Detail stamped on the preparation created at non-field intake.
pub const NON_FIELD_INTAKE_PREPARATION_DETAIL: &str = "auto-created on non-field intake";

/// Detail stamped on the preparation opened by an approved review.
pub const APPROVED_REVIEW_PREPARATION_DETAIL: &str = "auto-created on approved review";

/// Rule names recorded in the `detail.rule` of derived audit entries.
pub mod rules {
    pub const FIELD_INTAKE: &str = "field_intake";
    pub const NON_FIELD_INTAKE: &str = "non_field_intake";
    pub const REVIEW_OK: &str = "review_ok";
    pub const REVIEW_NOT_OK: &str = "review_not_ok";
    pub const PREPARATION_OK: &str = "preparation_ok";
    pub const PREPARATION_NOT_OK: &str = "preparation_not_ok";
}

/// Stage records a new movement receives at intake, in creation order.
#[must_use]
pub const fn intake_stages(origin: Origin) -> &'static [EntityType] {
    match origin {
        Origin::Field => &[EntityType::Diagnostic, EntityType::Review],
        Origin::Warranty | Origin::New => &[EntityType::Preparation],
    }
}

/// What a field movement's review (plus diagnosis) implies downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Rejected at review: the movement ends not operational.
    MarkNotOperational,
    /// Approved over a complete diagnosis: a pending preparation must exist.
    OpenPreparation,
    /// Nothing to do yet.
    Hold,
}

#[must_use]
pub const fn review_outcome(verdict: StageStatus, diagnostic_complete: bool) -> ReviewOutcome {
    match verdict {
        StageStatus::NotOk => ReviewOutcome::MarkNotOperational,
        StageStatus::Ok if diagnostic_complete => ReviewOutcome::OpenPreparation,
        StageStatus::Ok | StageStatus::Pending => ReviewOutcome::Hold,
    }
}

/// Final status implied by a preparation status; `None` leaves it unchanged.
#[must_use]
pub const fn preparation_outcome(status: StageStatus) -> Option<FinalStatus> {
    match status {
        StageStatus::Ok => Some(FinalStatus::Operational),
        StageStatus::NotOk => Some(FinalStatus::NotOperational),
        StageStatus::Pending => None,
    }
}

/// Diagnostics and reviews exist only for field movements.
///
/// # Errors
///
/// Returns `WorkflowError::GuardViolation` when `origin` does not carry `stage`.
pub fn check_stage_origin(
    stage: EntityType,
    movement_id: &str,
    origin: Origin,
) -> Result<(), WorkflowError> {
    let guarded = matches!(stage, EntityType::Diagnostic | EntityType::Review);
    if guarded && !origin.requires_review() {
        return Err(WorkflowError::GuardViolation {
            stage,
            movement_id: movement_id.to_string(),
            origin,
        });
    }
    Ok(())
}

/// Entry gate for inserting a preparation.
///
/// Field movements need a review whose verdict is OK; other origins pass.
///
/// # Errors
///
/// Returns `WorkflowError::GateViolation` for a field movement without an OK review.
pub fn check_preparation_gate(
    movement_id: &str,
    origin: Origin,
    review_verdict: Option<StageStatus>,
) -> Result<(), WorkflowError> {
    if origin.requires_review() && review_verdict != Some(StageStatus::Ok) {
        return Err(WorkflowError::GateViolation {
            movement_id: movement_id.to_string(),
            verdict: review_verdict,
        });
    }
    Ok(())
}

/// A changed plate must name its replacement.
///
/// # Errors
///
/// Returns `WorkflowError::StructuralInvariant` when `plate_changed` is set and
/// `final_plate_id` is missing or blank.
pub fn check_plate_invariant(
    plate_changed: bool,
    final_plate_id: Option<&str>,
) -> Result<(), WorkflowError> {
    let has_plate = final_plate_id.is_some_and(|plate| !plate.trim().is_empty());
    if plate_changed && !has_plate {
        return Err(WorkflowError::StructuralInvariant(
            "plate change recorded without a final plate id".into(),
        ));
    }
    Ok(())
}

/// Closed iff an exit date is set and `today` has reached it.
#[must_use]
pub fn movement_state(exit_date: Option<NaiveDate>, today: NaiveDate) -> MovementState {
    match exit_date {
        Some(exit) if exit <= today => MovementState::Closed,
        _ => MovementState::Open,
    }
}

/// Reject any mutation of a closed movement or its stage records.
///
/// # Errors
///
/// Returns `WorkflowError::EditLocked` when the movement is closed on `today`.
pub fn check_edit_lock(movement: &Movement, today: NaiveDate) -> Result<(), WorkflowError> {
    match movement.exit_date {
        Some(exit_date) if movement.is_closed_on(today) => Err(WorkflowError::EditLocked {
            movement_id: movement.id.clone(),
            exit_date,
        }),
        _ => Ok(()),
    }
}
