//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. Statements are idempotent (`IF NOT EXISTS`, `INSERT OR IGNORE`).

use crate::VtDb;
use crate::error::DatabaseError;

/// Initial schema: 7 tables, 4 indexes.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");
/// Default catalog labels.
const MIGRATION_002: &str = include_str!("../migrations/002_catalog_seed.sql");

impl VtDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial: {e}")))?;
        self.conn
            .execute_batch(MIGRATION_002)
            .await
            .map_err(|e| DatabaseError::Migration(format!("002_catalog_seed: {e}")))?;
        Ok(())
    }
}
