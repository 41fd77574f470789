//! Audit trail repository.
//!
//! Append-only entries recording every mutation, including the ones the
//! workflow derives on its own (auto-created stages, final status changes).
//! Entries are written inside the mutation's transaction.

use serde::Serialize;
use vt_core::entities::AuditEntry;
use vt_core::enums::{AuditAction, EntityType};
use vt_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::generate_id_on;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::WorkflowService;

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub movement_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actor: Option<String>,
    pub limit: Option<u32>,
}

/// One mutation to record.
pub(crate) struct AuditEvent<'a> {
    entity_type: EntityType,
    entity_id: &'a str,
    movement_id: Option<&'a str>,
    action: AuditAction,
    detail: Option<serde_json::Value>,
}

impl<'a> AuditEvent<'a> {
    pub(crate) const fn new(entity_type: EntityType, entity_id: &'a str, action: AuditAction) -> Self {
        Self {
            entity_type,
            entity_id,
            movement_id: None,
            action,
            detail: None,
        }
    }

    pub(crate) const fn movement(mut self, movement_id: &'a str) -> Self {
        self.movement_id = Some(movement_id);
        self
    }

    pub(crate) fn detail<T: Serialize>(mut self, detail: &T) -> Result<Self, DatabaseError> {
        self.detail =
            Some(serde_json::to_value(detail).map_err(|e| DatabaseError::Other(e.into()))?);
        Ok(self)
    }
}

const SELECT_COLS: &str = "id, actor, entity_type, entity_id, movement_id, action, detail, created_at";

fn row_to_audit(row: &libsql::Row) -> Result<AuditEntry, DatabaseError> {
    Ok(AuditEntry {
        id: row.get::<String>(0)?,
        actor: get_opt_string(row, 1)?,
        entity_type: parse_enum(&row.get::<String>(2)?)?,
        entity_id: row.get::<String>(3)?,
        movement_id: get_opt_string(row, 4)?,
        action: parse_enum(&row.get::<String>(5)?)?,
        detail: parse_optional_json(get_opt_string(row, 6)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

/// Append an audit entry on `conn`.
pub(crate) async fn append_audit(
    conn: &libsql::Connection,
    entry: &AuditEntry,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO audit_trail (id, actor, entity_type, entity_id, movement_id, action, detail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        libsql::params![
            entry.id.as_str(),
            entry.actor.as_deref(),
            entry.entity_type.as_str(),
            entry.entity_id.as_str(),
            entry.movement_id.as_deref(),
            entry.action.as_str(),
            entry.detail.as_ref().map(std::string::ToString::to_string),
            entry.created_at.to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}

impl WorkflowService {
    /// Record `event` on `conn` as performed by `actor`.
    pub(crate) async fn record_audit(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        event: AuditEvent<'_>,
    ) -> Result<AuditEntry, DatabaseError> {
        let entry = AuditEntry {
            id: generate_id_on(conn, PREFIX_AUDIT).await?,
            actor: actor.map(String::from),
            entity_type: event.entity_type,
            entity_id: event.entity_id.to_string(),
            movement_id: event.movement_id.map(String::from),
            action: event.action,
            detail: event.detail,
            created_at: self.now(),
        };
        append_audit(conn, &entry).await?;
        Ok(entry)
    }

    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref et) = filter.entity_type {
            params.push(libsql::Value::Text(et.as_str().to_string()));
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(ref eid) = filter.entity_id {
            params.push(libsql::Value::Text(eid.clone()));
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(ref mid) = filter.movement_id {
            params.push(libsql::Value::Text(mid.clone()));
            conditions.push(format!("movement_id = ?{}", params.len()));
        }
        if let Some(ref action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(ref actor) = filter.actor {
            params.push(libsql::Value::Text(actor.clone()));
            conditions.push(format!("actor = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM audit_trail {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let _gate = self.read_gate().await;
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit(&row)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use vt_core::enums::{AuditAction, EntityType, Origin};

    use super::AuditFilter;
    use crate::test_support::helpers::{open_test_movement, test_service};

    #[tokio::test]
    async fn intake_is_audited_with_actor() {
        let svc = test_service().await;
        let movement = open_test_movement(&svc, Origin::Warranty).await;

        let entries = svc
            .query_audit(&AuditFilter {
                movement_id: Some(movement.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        let created = entries
            .iter()
            .find(|e| e.entity_type == EntityType::Movement)
            .unwrap();
        assert_eq!(created.action, AuditAction::Created);
        assert_eq!(created.actor.as_deref(), Some("tech-1"));

        let auto = entries
            .iter()
            .find(|e| e.entity_type == EntityType::Preparation)
            .unwrap();
        assert_eq!(auto.action, AuditAction::AutoCreated);
        assert_eq!(auto.detail.as_ref().unwrap()["rule"], "non_field_intake");
    }

    #[tokio::test]
    async fn filter_by_action_and_limit() {
        let svc = test_service().await;
        open_test_movement(&svc, Origin::Field).await;
        open_test_movement(&svc, Origin::New).await;

        let auto = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::AutoCreated),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(auto.len(), 3);
        assert!(auto.iter().all(|e| e.action == AuditAction::AutoCreated));

        let limited = svc
            .query_audit(&AuditFilter {
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }
}
