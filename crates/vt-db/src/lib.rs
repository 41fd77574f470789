//! # vt-db
//!
//! libSQL persistence for valtrack.
//!
//! Holds the relational state of the validator workflow: validators,
//! movements, the three stage tables, the catalog and the audit trail.
//! `WorkflowService` layers the workflow rules on top: every mutation runs in
//! one write transaction that evaluates guards, writes, propagates derived
//! effects and appends audit entries before committing.

pub mod catalog;
pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle.
///
/// Wraps a libSQL database and its connection. Provides ID generation.
pub struct VtDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl VtDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let vt_db = Self { db, conn };
        vt_db.run_migrations().await?;
        Ok(vt_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"mov-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        generate_id_on(&self.conn, prefix).await
    }
}

/// Generate a prefixed ID on a specific connection (or open transaction).
///
/// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
pub(crate) async fn generate_id_on(
    conn: &libsql::Connection,
    prefix: &str,
) -> Result<String, DatabaseError> {
    let mut rows = conn
        .query("SELECT ?1 || '-' || lower(hex(randomblob(4)))", [prefix])
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<String>(0)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> VtDb {
        VtDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "catalog",
            "validators",
            "movements",
            "diagnostics",
            "supervisor_reviews",
            "preparations",
            "audit_trail",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn catalog_is_seeded() {
        let db = test_db().await;
        let mut rows = db
            .conn()
            .query(
                "SELECT count(*) FROM catalog WHERE kind = 'origin' AND name IN ('Terreno', 'Garantía', 'Nuevo')",
                (),
            )
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 3);
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("mov").await.unwrap();
        assert!(id.starts_with("mov-"), "ID should start with 'mov-': {id}");
        assert_eq!(id.len(), 12, "ID should be 12 chars: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in vt_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(vt_core::ids::has_prefix(&id, prefix));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
        let mut rows = db
            .conn()
            .query("SELECT count(*) FROM catalog WHERE name = 'OK'", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }

    #[tokio::test]
    async fn second_stage_row_rejected_by_schema() {
        let db = test_db().await;
        db.conn()
            .execute_batch(
                "INSERT INTO validators (id, hardware_id, validator_type) VALUES ('val-t1', 'HW-1', 'bus');
                 INSERT INTO movements (id, validator_id, intake_date, origin_id)
                     VALUES ('mov-t1', 'val-t1', '2024-01-01', (SELECT id FROM catalog WHERE kind = 'origin' AND name = 'Terreno'));
                 INSERT INTO diagnostics (id, movement_id) VALUES ('dgn-t1', 'mov-t1');",
            )
            .await
            .unwrap();

        let err = db
            .conn()
            .execute(
                "INSERT INTO diagnostics (id, movement_id) VALUES ('dgn-t2', 'mov-t1')",
                (),
            )
            .await
            .unwrap_err();
        assert!(helpers::is_unique_violation(&err), "{err}");
    }

    #[tokio::test]
    async fn plate_check_constraint_enforced() {
        let db = test_db().await;
        db.conn()
            .execute_batch(
                "INSERT INTO validators (id, hardware_id, validator_type) VALUES ('val-t1', 'HW-1', 'bus');
                 INSERT INTO movements (id, validator_id, intake_date, origin_id)
                     VALUES ('mov-t1', 'val-t1', '2024-01-01', (SELECT id FROM catalog WHERE kind = 'origin' AND name = 'Nuevo'));",
            )
            .await
            .unwrap();

        let err = db
            .conn()
            .execute(
                "INSERT INTO preparations (id, movement_id, status_id, plate_changed)
                 VALUES ('prp-t1', 'mov-t1', (SELECT id FROM catalog WHERE name = 'OK'), 1)",
                (),
            )
            .await
            .unwrap_err();
        assert!(helpers::is_check_violation(&err), "{err}");
    }
}
