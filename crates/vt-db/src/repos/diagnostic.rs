//! Diagnostic stage: the technician's fault check on a field intake.

use vt_core::audit_detail::AutoCreatedDetail;
use vt_core::entities::Diagnostic;
use vt_core::enums::{AuditAction, EntityType};
use vt_core::errors::WorkflowError;
use vt_core::ids::PREFIX_DIAGNOSTIC;
use vt_core::workflow;

use crate::error::DatabaseError;
use crate::generate_id_on;
use crate::helpers::{
    flag_value, get_opt_bool, get_opt_string, map_stage_insert_error, parse_datetime,
    parse_optional_datetime, text_value,
};
use crate::repos::audit::AuditEvent;
use crate::service::WorkflowService;
use crate::updates::DiagnosticUpdate;

const SELECT_COLS: &str = "id, movement_id, initial_plate_id, fault_code, has_fault, is_connected, \
                           connection_time, note, created_by, created_at, updated_at";

fn row_to_diagnostic(row: &libsql::Row) -> Result<Diagnostic, DatabaseError> {
    Ok(Diagnostic {
        id: row.get(0)?,
        movement_id: row.get(1)?,
        initial_plate_id: get_opt_string(row, 2)?,
        fault_code: get_opt_string(row, 3)?,
        has_fault: get_opt_bool(row, 4)?,
        is_connected: get_opt_bool(row, 5)?,
        connection_time: parse_optional_datetime(get_opt_string(row, 6)?.as_deref())?,
        note: get_opt_string(row, 7)?,
        created_by: get_opt_string(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

pub(crate) async fn find_diagnostic(
    conn: &libsql::Connection,
    movement_id: &str,
) -> Result<Option<Diagnostic>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM diagnostics WHERE movement_id = ?1"),
            [movement_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_diagnostic(&row)?)),
        None => Ok(None),
    }
}

impl WorkflowService {
    /// INSERT a diagnostic row. `rule` marks it as derived.
    pub(crate) async fn insert_diagnostic_row(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        movement_id: &str,
        update: &DiagnosticUpdate,
        rule: Option<&str>,
    ) -> Result<Diagnostic, DatabaseError> {
        let now = self.now();
        let id = generate_id_on(conn, PREFIX_DIAGNOSTIC).await?;
        let diagnostic = Diagnostic {
            id: id.clone(),
            movement_id: movement_id.to_string(),
            initial_plate_id: update.initial_plate_id.clone().flatten(),
            fault_code: update.fault_code.clone().flatten(),
            has_fault: update.has_fault,
            is_connected: update.is_connected,
            connection_time: update.connection_time,
            note: update.note.clone().flatten(),
            created_by: actor.map(String::from),
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            "INSERT INTO diagnostics (id, movement_id, initial_plate_id, fault_code, has_fault, is_connected,
                                      connection_time, note, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            libsql::params![
                id.as_str(),
                movement_id,
                text_value(diagnostic.initial_plate_id.clone()),
                text_value(diagnostic.fault_code.clone()),
                flag_value(diagnostic.has_fault),
                flag_value(diagnostic.is_connected),
                text_value(diagnostic.connection_time.map(|t| t.to_rfc3339())),
                text_value(diagnostic.note.clone()),
                actor,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )
        .await
        .map_err(|e| map_stage_insert_error(e, EntityType::Diagnostic, movement_id))?;

        let event = match rule {
            Some(rule) => AuditEvent::new(EntityType::Diagnostic, &id, AuditAction::AutoCreated)
                .detail(&AutoCreatedDetail { rule: rule.to_string() })?,
            None => AuditEvent::new(EntityType::Diagnostic, &id, AuditAction::Created),
        };
        self.record_audit(conn, actor, event.movement(movement_id)).await?;
        Ok(diagnostic)
    }

    async fn update_diagnostic_row(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        existing: &Diagnostic,
        update: &DiagnosticUpdate,
    ) -> Result<(), DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref plate) = update.initial_plate_id {
            params.push(text_value(plate.clone()));
            sets.push(format!("initial_plate_id = ?{}", params.len()));
        }
        if let Some(ref code) = update.fault_code {
            params.push(text_value(code.clone()));
            sets.push(format!("fault_code = ?{}", params.len()));
        }
        if let Some(has_fault) = update.has_fault {
            params.push(flag_value(Some(has_fault)));
            sets.push(format!("has_fault = ?{}", params.len()));
        }
        if let Some(is_connected) = update.is_connected {
            params.push(flag_value(Some(is_connected)));
            sets.push(format!("is_connected = ?{}", params.len()));
        }
        if let Some(at) = update.connection_time {
            params.push(at.to_rfc3339().into());
            sets.push(format!("connection_time = ?{}", params.len()));
        }
        if let Some(ref note) = update.note {
            params.push(text_value(note.clone()));
            sets.push(format!("note = ?{}", params.len()));
        }

        params.push(self.now().to_rfc3339().into());
        sets.push(format!("updated_at = ?{}", params.len()));
        params.push(existing.id.clone().into());
        let sql = format!(
            "UPDATE diagnostics SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );
        conn.execute(&sql, libsql::params_from_iter(params)).await?;

        self.record_audit(
            conn,
            actor,
            AuditEvent::new(EntityType::Diagnostic, &existing.id, AuditAction::Updated)
                .movement(&existing.movement_id)
                .detail(update)?,
        )
        .await?;
        Ok(())
    }

    /// Create or update the diagnostic of a field movement.
    ///
    /// A completed diagnostic under an already approved review opens the
    /// preparation in the same transaction.
    ///
    /// # Errors
    ///
    /// - `WorkflowError::NotFound` if the movement does not exist.
    /// - `WorkflowError::EditLocked` if the movement is closed.
    /// - `WorkflowError::GuardViolation` if the movement is not a field intake.
    /// - `WorkflowError::DuplicateStage` if a concurrent writer created it first.
    pub async fn record_diagnostic(
        &self,
        actor: Option<&str>,
        movement_id: &str,
        update: DiagnosticUpdate,
    ) -> Result<Diagnostic, DatabaseError> {
        let tx = self.begin_write().await?;
        let result = self.record_diagnostic_in(&tx, actor, movement_id, &update).await;
        tx.finish(result).await
    }

    async fn record_diagnostic_in(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        movement_id: &str,
        update: &DiagnosticUpdate,
    ) -> Result<Diagnostic, DatabaseError> {
        let movement = self.load_movement(conn, movement_id).await?;
        let existing = find_diagnostic(conn, movement_id).await?;
        self.check_lock(&movement, existing.is_none())?;
        workflow::check_stage_origin(EntityType::Diagnostic, movement_id, movement.origin)?;

        match existing {
            Some(ref existing) if update.is_empty() => return Ok(existing.clone()),
            Some(ref existing) => {
                self.update_diagnostic_row(conn, actor, existing, update)
                    .await?;
            }
            None => {
                self.insert_diagnostic_row(conn, actor, movement_id, update, None)
                    .await?;
            }
        }

        self.propagate_review(conn, actor, &movement).await?;
        find_diagnostic(conn, movement_id)
            .await?
            .ok_or(DatabaseError::NoResult)
    }

    /// # Errors
    ///
    /// Returns `WorkflowError::NotFound` if the movement has no diagnostic.
    pub async fn get_diagnostic(&self, movement_id: &str) -> Result<Diagnostic, DatabaseError> {
        let _gate = self.read_gate().await;
        find_diagnostic(self.db().conn(), movement_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityType::Diagnostic, movement_id).into())
    }
}
