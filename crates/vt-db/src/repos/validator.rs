//! Validator registry.

use vt_core::entities::Validator;
use vt_core::enums::{AuditAction, EntityType};
use vt_core::errors::WorkflowError;
use vt_core::ids::PREFIX_VALIDATOR;

use crate::error::DatabaseError;
use crate::generate_id_on;
use crate::helpers::{get_opt_string, is_unique_violation, parse_datetime};
use crate::repos::audit::AuditEvent;
use crate::service::WorkflowService;

const SELECT_COLS: &str = "id, hardware_id, validator_type, created_by, created_at";

fn row_to_validator(row: &libsql::Row) -> Result<Validator, DatabaseError> {
    Ok(Validator {
        id: row.get(0)?,
        hardware_id: row.get(1)?,
        validator_type: row.get(2)?,
        created_by: get_opt_string(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

pub(crate) async fn find_validator(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Option<Validator>, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM validators WHERE id = ?1"), [id])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_validator(&row)?)),
        None => Ok(None),
    }
}

impl WorkflowService {
    /// Register a physical validator.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Conflict` if the hardware id is already registered.
    pub async fn create_validator(
        &self,
        actor: Option<&str>,
        hardware_id: &str,
        validator_type: &str,
    ) -> Result<Validator, DatabaseError> {
        let tx = self.begin_write().await?;
        let result = self
            .create_validator_in(&tx, actor, hardware_id, validator_type)
            .await;
        tx.finish(result).await
    }

    async fn create_validator_in(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        hardware_id: &str,
        validator_type: &str,
    ) -> Result<Validator, DatabaseError> {
        let now = self.now();
        let id = generate_id_on(conn, PREFIX_VALIDATOR).await?;

        conn.execute(
            "INSERT INTO validators (id, hardware_id, validator_type, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            libsql::params![id.as_str(), hardware_id, validator_type, actor, now.to_rfc3339()],
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DatabaseError::Conflict(format!("validator '{hardware_id}' is already registered"))
            } else {
                e.into()
            }
        })?;

        self.record_audit(
            conn,
            actor,
            AuditEvent::new(EntityType::Validator, &id, AuditAction::Created),
        )
        .await?;

        tracing::debug!(validator_id = %id, hardware_id, "validator registered");
        Ok(Validator {
            id,
            hardware_id: hardware_id.to_string(),
            validator_type: validator_type.to_string(),
            created_by: actor.map(String::from),
            created_at: now,
        })
    }

    /// # Errors
    ///
    /// Returns `WorkflowError::NotFound` if no validator has this id.
    pub async fn get_validator(&self, id: &str) -> Result<Validator, DatabaseError> {
        let _gate = self.read_gate().await;
        find_validator(self.db().conn(), id)
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityType::Validator, id).into())
    }

    /// # Errors
    ///
    /// Returns `WorkflowError::NotFound` if no validator has this hardware id.
    pub async fn get_validator_by_hardware_id(
        &self,
        hardware_id: &str,
    ) -> Result<Validator, DatabaseError> {
        let _gate = self.read_gate().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM validators WHERE hardware_id = ?1"),
                [hardware_id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityType::Validator, hardware_id))?;
        row_to_validator(&row)
    }

    /// Most recently registered first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_validators(&self, limit: u32) -> Result<Vec<Validator>, DatabaseError> {
        let _gate = self.read_gate().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM validators ORDER BY created_at DESC, rowid DESC LIMIT ?1"
                ),
                [i64::from(limit)],
            )
            .await?;
        let mut validators = Vec::new();
        while let Some(row) = rows.next().await? {
            validators.push(row_to_validator(&row)?);
        }
        Ok(validators)
    }
}
