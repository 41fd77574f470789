//! Preparation stage, its entry gate and the final-status effect.

use vt_core::audit_detail::AutoCreatedDetail;
use vt_core::entities::{Movement, Preparation};
use vt_core::enums::{AuditAction, EntityType, FinalStatus, StageStatus};
use vt_core::errors::WorkflowError;
use vt_core::ids::PREFIX_PREPARATION;
use vt_core::workflow::{self, rules};

use crate::catalog::Catalog;
use crate::error::DatabaseError;
use crate::generate_id_on;
use crate::helpers::{
    format_date, get_bool, get_opt_string, map_stage_insert_error, parse_datetime,
    parse_optional_date, text_value,
};
use crate::repos::audit::AuditEvent;
use crate::repos::review::find_review;
use crate::service::WorkflowService;
use crate::updates::PreparationUpdate;

const SELECT_COLS: &str = "id, movement_id, technician_id, status_id, plate_changed, detail, \
                           final_plate_id, prepared_on, created_by, created_at, updated_at";

fn row_to_preparation(row: &libsql::Row, catalog: &Catalog) -> Result<Preparation, DatabaseError> {
    Ok(Preparation {
        id: row.get(0)?,
        movement_id: row.get(1)?,
        technician_id: get_opt_string(row, 2)?,
        status: catalog.stage_of(row.get::<i64>(3)?)?,
        plate_changed: get_bool(row, 4)?,
        detail: get_opt_string(row, 5)?,
        final_plate_id: get_opt_string(row, 6)?,
        prepared_on: parse_optional_date(get_opt_string(row, 7)?.as_deref())?,
        created_by: get_opt_string(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

pub(crate) async fn find_preparation(
    conn: &libsql::Connection,
    movement_id: &str,
    catalog: &Catalog,
) -> Result<Option<Preparation>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM preparations WHERE movement_id = ?1"),
            [movement_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_preparation(&row, catalog)?)),
        None => Ok(None),
    }
}

const fn outcome_rule(target: FinalStatus) -> &'static str {
    match target {
        FinalStatus::Operational => rules::PREPARATION_OK,
        FinalStatus::NotOperational => rules::PREPARATION_NOT_OK,
    }
}

impl WorkflowService {
    /// INSERT a preparation row. A missing status is stored as pending.
    pub(crate) async fn insert_preparation_row(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        movement_id: &str,
        update: &PreparationUpdate,
        rule: Option<&str>,
    ) -> Result<Preparation, DatabaseError> {
        let status = update.status.unwrap_or(StageStatus::Pending);
        let status_id = self.catalog().stage_id(status)?;
        let now = self.now();
        let id = generate_id_on(conn, PREFIX_PREPARATION).await?;
        let preparation = Preparation {
            id: id.clone(),
            movement_id: movement_id.to_string(),
            technician_id: update.technician_id.clone().flatten(),
            status,
            plate_changed: update.plate_changed.unwrap_or(false),
            detail: update.detail.clone().flatten(),
            final_plate_id: update.final_plate_id.clone().flatten(),
            prepared_on: update.prepared_on.flatten(),
            created_by: actor.map(String::from),
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            "INSERT INTO preparations (id, movement_id, technician_id, status_id, plate_changed, detail,
                                       final_plate_id, prepared_on, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            libsql::params![
                id.as_str(),
                movement_id,
                text_value(preparation.technician_id.clone()),
                status_id,
                i64::from(preparation.plate_changed),
                text_value(preparation.detail.clone()),
                text_value(preparation.final_plate_id.clone()),
                text_value(preparation.prepared_on.map(format_date)),
                actor,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )
        .await
        .map_err(|e| map_stage_insert_error(e, EntityType::Preparation, movement_id))?;

        let event = match rule {
            Some(rule) => AuditEvent::new(EntityType::Preparation, &id, AuditAction::AutoCreated)
                .detail(&AutoCreatedDetail { rule: rule.to_string() })?,
            None => AuditEvent::new(EntityType::Preparation, &id, AuditAction::Created),
        };
        self.record_audit(conn, actor, event.movement(movement_id)).await?;
        Ok(preparation)
    }

    async fn update_preparation_row(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        existing: &Preparation,
        update: &PreparationUpdate,
    ) -> Result<(), DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref technician) = update.technician_id {
            params.push(text_value(technician.clone()));
            sets.push(format!("technician_id = ?{}", params.len()));
        }
        if let Some(status) = update.status {
            params.push(self.catalog().stage_id(status)?.into());
            sets.push(format!("status_id = ?{}", params.len()));
        }
        if let Some(changed) = update.plate_changed {
            params.push(i64::from(changed).into());
            sets.push(format!("plate_changed = ?{}", params.len()));
        }
        if let Some(ref detail) = update.detail {
            params.push(text_value(detail.clone()));
            sets.push(format!("detail = ?{}", params.len()));
        }
        if let Some(ref plate) = update.final_plate_id {
            params.push(text_value(plate.clone()));
            sets.push(format!("final_plate_id = ?{}", params.len()));
        }
        if let Some(prepared_on) = update.prepared_on {
            params.push(text_value(prepared_on.map(format_date)));
            sets.push(format!("prepared_on = ?{}", params.len()));
        }

        params.push(self.now().to_rfc3339().into());
        sets.push(format!("updated_at = ?{}", params.len()));
        params.push(existing.id.clone().into());
        let sql = format!(
            "UPDATE preparations SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );
        conn.execute(&sql, libsql::params_from_iter(params))
            .await
            .map_err(|e| map_stage_insert_error(e, EntityType::Preparation, &existing.movement_id))?;

        let action = match update.status {
            Some(status) if status != existing.status => AuditAction::StatusChanged,
            _ => AuditAction::Updated,
        };
        self.record_audit(
            conn,
            actor,
            AuditEvent::new(EntityType::Preparation, &existing.id, action)
                .movement(&existing.movement_id)
                .detail(update)?,
        )
        .await?;
        Ok(())
    }

    /// Field movements need an approved review before a preparation exists.
    async fn check_gate(
        &self,
        conn: &libsql::Connection,
        movement: &Movement,
    ) -> Result<(), DatabaseError> {
        let verdict = if movement.origin.requires_review() {
            find_review(conn, &movement.id, self.catalog())
                .await?
                .map(|r| r.verdict)
        } else {
            None
        };
        workflow::check_preparation_gate(&movement.id, movement.origin, verdict).map_err(|e| {
            tracing::debug!(movement_id = %movement.id, ?verdict, "preparation gate closed");
            e.into()
        })
    }

    /// Open a pending preparation unless one exists. Returns whether it did.
    ///
    /// The UNIQUE(movement_id) conflict is absorbed, so re-running the
    /// approval never duplicates or overwrites the record.
    pub(crate) async fn ensure_preparation(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        movement_id: &str,
    ) -> Result<bool, DatabaseError> {
        let pending_id = self.catalog().stage_id(StageStatus::Pending)?;
        let now = self.now();
        let id = generate_id_on(conn, PREFIX_PREPARATION).await?;
        let inserted = conn
            .execute(
                "INSERT INTO preparations (id, movement_id, status_id, plate_changed, detail, created_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, ?7)
                 ON CONFLICT(movement_id) DO NOTHING",
                libsql::params![
                    id.as_str(),
                    movement_id,
                    pending_id,
                    workflow::APPROVED_REVIEW_PREPARATION_DETAIL,
                    actor,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;
        if inserted == 0 {
            tracing::debug!(movement_id, "preparation already exists");
            return Ok(false);
        }

        self.record_audit(
            conn,
            actor,
            AuditEvent::new(EntityType::Preparation, &id, AuditAction::AutoCreated)
                .movement(movement_id)
                .detail(&AutoCreatedDetail {
                    rule: rules::REVIEW_OK.to_string(),
                })?,
        )
        .await?;
        tracing::info!(movement_id, preparation_id = %id, "preparation opened by approved review");
        Ok(true)
    }

    /// Derive the movement's final status from a preparation status.
    async fn apply_preparation_outcome(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        movement: &Movement,
        status: StageStatus,
    ) -> Result<(), DatabaseError> {
        match workflow::preparation_outcome(status) {
            Some(target) => {
                self.set_final_status(conn, actor, movement, target, outcome_rule(target))
                    .await?;
            }
            None => {
                tracing::debug!(movement_id = %movement.id, "preparation pending, final status unchanged");
            }
        }
        Ok(())
    }

    /// Create the preparation of a movement.
    ///
    /// # Errors
    ///
    /// - `WorkflowError::NotFound` if the movement does not exist.
    /// - `WorkflowError::EditLocked` if the movement is closed.
    /// - `WorkflowError::GateViolation` for a field movement without an OK review.
    /// - `WorkflowError::StructuralInvariant` for a plate change without a plate.
    /// - `WorkflowError::DuplicateStage` if the movement already has one.
    pub async fn insert_preparation(
        &self,
        actor: Option<&str>,
        movement_id: &str,
        update: PreparationUpdate,
    ) -> Result<Preparation, DatabaseError> {
        let tx = self.begin_write().await?;
        let result = self
            .insert_preparation_in(&tx, actor, movement_id, &update)
            .await;
        tx.finish(result).await
    }

    async fn insert_preparation_in(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        movement_id: &str,
        update: &PreparationUpdate,
    ) -> Result<Preparation, DatabaseError> {
        let movement = self.load_movement(conn, movement_id).await?;
        self.check_lock(&movement, true)?;
        self.check_gate(conn, &movement).await?;
        workflow::check_plate_invariant(
            update.plate_changed.unwrap_or(false),
            update.final_plate_id.as_ref().and_then(Option::as_deref),
        )?;
        let preparation = self
            .insert_preparation_row(conn, actor, movement_id, update, None)
            .await?;
        self.apply_preparation_outcome(conn, actor, &movement, preparation.status)
            .await?;
        Ok(preparation)
    }

    /// Create or update the preparation of a movement.
    ///
    /// The plate invariant is checked on the merged record; the entry gate
    /// only when the record is created.
    ///
    /// # Errors
    ///
    /// Same as [`Self::insert_preparation`], with `DuplicateStage` only when a
    /// concurrent writer created the record first.
    pub async fn record_preparation(
        &self,
        actor: Option<&str>,
        movement_id: &str,
        update: PreparationUpdate,
    ) -> Result<Preparation, DatabaseError> {
        let tx = self.begin_write().await?;
        let result = self
            .record_preparation_in(&tx, actor, movement_id, &update)
            .await;
        tx.finish(result).await
    }

    async fn record_preparation_in(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        movement_id: &str,
        update: &PreparationUpdate,
    ) -> Result<Preparation, DatabaseError> {
        let movement = self.load_movement(conn, movement_id).await?;
        let existing = find_preparation(conn, movement_id, self.catalog()).await?;
        self.check_lock(&movement, existing.is_none())?;

        match existing {
            Some(ref existing) if update.is_empty() => return Ok(existing.clone()),
            Some(ref existing) => {
                let plate_changed = update.plate_changed.unwrap_or(existing.plate_changed);
                let final_plate = match update.final_plate_id {
                    Some(ref plate) => plate.as_deref(),
                    None => existing.final_plate_id.as_deref(),
                };
                workflow::check_plate_invariant(plate_changed, final_plate)?;
                self.update_preparation_row(conn, actor, existing, update)
                    .await?;
            }
            None => {
                self.check_gate(conn, &movement).await?;
                workflow::check_plate_invariant(
                    update.plate_changed.unwrap_or(false),
                    update.final_plate_id.as_ref().and_then(Option::as_deref),
                )?;
                self.insert_preparation_row(conn, actor, movement_id, update, None)
                    .await?;
            }
        }

        let preparation = find_preparation(conn, movement_id, self.catalog())
            .await?
            .ok_or(DatabaseError::NoResult)?;
        self.apply_preparation_outcome(conn, actor, &movement, preparation.status)
            .await?;
        Ok(preparation)
    }

    /// # Errors
    ///
    /// Returns `WorkflowError::NotFound` if the movement has no preparation.
    pub async fn get_preparation(&self, movement_id: &str) -> Result<Preparation, DatabaseError> {
        let _gate = self.read_gate().await;
        find_preparation(self.db().conn(), movement_id, self.catalog())
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityType::Preparation, movement_id).into())
    }
}
