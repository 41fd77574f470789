//! Workflow policy settings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const fn default_lock_inserts() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Also reject stage *inserts* for closed movements, not only updates.
    #[serde(default = "default_lock_inserts")]
    pub lock_inserts: bool,

    /// Pin the processing date used by the edit lock (ISO `YYYY-MM-DD`).
    /// Unset means the system clock.
    #[serde(default)]
    pub processing_date: Option<NaiveDate>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            lock_inserts: default_lock_inserts(),
            processing_date: None,
        }
    }
}
