use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Diagnostic, Preparation, SupervisorReview};
use crate::enums::{FinalStatus, MovementState, Origin};
use crate::workflow;

/// One lifecycle cycle of a validator through intake, diagnosis, review and preparation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Movement {
    pub id: String,
    pub validator_id: String,
    pub intake_date: NaiveDate,
    pub origin: Origin,
    pub exit_date: Option<NaiveDate>,
    /// Catalog name of the shipment classification.
    pub shipment_type: Option<String>,
    /// Derived by the workflow rules only.
    pub final_status: Option<FinalStatus>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movement {
    #[must_use]
    pub fn state_on(&self, today: NaiveDate) -> MovementState {
        workflow::movement_state(self.exit_date, today)
    }

    #[must_use]
    pub fn is_closed_on(&self, today: NaiveDate) -> bool {
        self.state_on(today) == MovementState::Closed
    }
}

/// A movement together with whichever stage records it currently has.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MovementStages {
    pub movement: Movement,
    pub state: MovementState,
    pub diagnostic: Option<Diagnostic>,
    pub review: Option<SupervisorReview>,
    pub preparation: Option<Preparation>,
}
