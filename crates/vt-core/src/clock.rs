//! Source of the current processing date.
//!
//! The edit lock compares exit dates against "today". Rules never read the
//! system clock directly; the service is handed a `Clock` so tests and
//! back-dated runs can pin the date.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    /// Current instant, used for `created_at` / `updated_at` stamps.
    fn now(&self) -> DateTime<Utc>;

    /// Current processing date, used for closure checks.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a settable instant. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    #[must_use]
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Arc::new(Mutex::new(instant)),
        }
    }

    /// Pin to midnight UTC of `date`.
    #[must_use]
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }

    /// Move to midnight UTC of `date`; every clone follows.
    pub fn set_date(&self, date: NaiveDate) {
        *self.instant.lock().unwrap_or_else(PoisonError::into_inner) =
            date.and_time(chrono::NaiveTime::MIN).and_utc();
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
