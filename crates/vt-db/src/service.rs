//! Service layer running workflow mutations in write transactions.
//!
//! `WorkflowService` wraps `VtDb` (raw database access), the resolved
//! `Catalog` and an injected `Clock`. All repo methods are implemented as
//! `impl WorkflowService`.

use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use libsql::TransactionBehavior;
use tokio::sync::{Mutex, MutexGuard};
use vt_config::{CatalogConfig, ValtrackConfig};
use vt_core::clock::{Clock, FixedClock, SystemClock};
use vt_core::entities::Movement;
use vt_core::workflow;

use crate::VtDb;
use crate::catalog::Catalog;
use crate::error::DatabaseError;

/// Orchestrates workflow mutations with guards, propagation and audit.
///
/// Every mutation method follows this protocol:
/// 1. Acquire the write gate and begin an IMMEDIATE transaction
/// 2. Load the movement and evaluate edit lock, origin guard, gate and
///    structural checks
/// 3. Execute SQL (stage UNIQUE constraints decide duplicate races)
/// 4. Apply derived effects (auto-created stages, final status)
/// 5. Append audit entries (inside transaction)
/// 6. Commit, or roll back on any error
pub struct WorkflowService {
    db: VtDb,
    catalog: Catalog,
    clock: Arc<dyn Clock>,
    lock_inserts: bool,
    write_gate: Mutex<()>,
}

/// An open write transaction holding the service's write gate.
///
/// Derefs to the transaction's connection so inner helpers take
/// `&libsql::Connection` whether or not they run inside a transaction.
pub(crate) struct WriteTx<'a> {
    tx: libsql::Transaction,
    _gate: MutexGuard<'a, ()>,
}

impl Deref for WriteTx<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

impl WriteTx<'_> {
    /// Commit if `result` is `Ok`, roll back otherwise.
    pub(crate) async fn finish<T>(
        self,
        result: Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let Self { tx, _gate } = self;
        match result {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(%rollback, "rollback failed");
                }
                Err(error)
            }
        }
    }
}

impl WorkflowService {
    /// Open the configured database and resolve the configured catalog.
    ///
    /// A pinned `workflow.processing_date` yields a fixed clock on that date.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or the
    /// catalog cannot be read.
    pub async fn open(config: &ValtrackConfig) -> Result<Self, DatabaseError> {
        let clock: Arc<dyn Clock> = match config.workflow.processing_date {
            Some(date) => Arc::new(FixedClock::at_date(date)),
            None => Arc::new(SystemClock),
        };
        let parent = std::path::Path::new(&config.database.path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent.filter(|_| !config.database.is_in_memory()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::InvalidState(format!(
                    "cannot create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let service = Self::new_local(&config.database.path, &config.catalog, clock).await?;
        Ok(service.with_insert_lock(config.workflow.lock_inserts))
    }

    /// Create a new service over a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `names` - Catalog labels to resolve.
    /// * `clock` - Source of "today" for the edit lock and of timestamps.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(
        db_path: &str,
        names: &CatalogConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DatabaseError> {
        let db = VtDb::open_local(db_path).await?;
        let catalog = Catalog::load(db.conn(), names).await?;
        Ok(Self::from_parts(db, catalog, clock))
    }

    /// Assemble from an opened database and a resolved catalog.
    #[must_use]
    pub fn from_parts(db: VtDb, catalog: Catalog, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            catalog,
            clock,
            lock_inserts: true,
            write_gate: Mutex::new(()),
        }
    }

    /// Whether stage inserts into a closed movement are rejected.
    #[must_use]
    pub const fn with_insert_lock(mut self, lock_inserts: bool) -> Self {
        self.lock_inserts = lock_inserts;
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &VtDb {
        &self.db
    }

    /// Access the resolved catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Serialize on the write gate and open an IMMEDIATE transaction.
    pub(crate) async fn begin_write(&self) -> Result<WriteTx<'_>, DatabaseError> {
        let gate = self.write_gate.lock().await;
        let tx = self
            .db
            .conn()
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;
        Ok(WriteTx { tx, _gate: gate })
    }

    /// Wait out any open write so a read sees committed state only.
    ///
    /// All access shares one connection; an uncommitted transaction would
    /// otherwise be visible to concurrent readers.
    pub(crate) async fn read_gate(&self) -> MutexGuard<'_, ()> {
        self.write_gate.lock().await
    }

    /// Edit lock for a mutation of `movement`.
    ///
    /// Updates of existing rows are always checked; inserts only when
    /// `lock_inserts` is set.
    pub(crate) fn check_lock(
        &self,
        movement: &Movement,
        is_insert: bool,
    ) -> Result<(), DatabaseError> {
        if is_insert && !self.lock_inserts {
            return Ok(());
        }
        workflow::check_edit_lock(movement, self.today()).map_err(|e| {
            tracing::debug!(movement_id = %movement.id, today = %self.today(), "edit lock rejected write");
            e.into()
        })
    }
}
