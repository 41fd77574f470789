//! Supervisor review stage and its propagation.
//!
//! The review verdict drives the field path: NOT OK marks the movement not
//! operational; OK with a complete diagnostic opens the preparation.

use vt_core::audit_detail::AutoCreatedDetail;
use vt_core::entities::{Movement, SupervisorReview};
use vt_core::enums::{AuditAction, EntityType, FinalStatus, StageStatus};
use vt_core::errors::WorkflowError;
use vt_core::ids::PREFIX_REVIEW;
use vt_core::workflow::{self, ReviewOutcome, rules};

use crate::catalog::Catalog;
use crate::error::DatabaseError;
use crate::generate_id_on;
use crate::helpers::{
    format_date, get_bool, get_opt_string, map_stage_insert_error, parse_datetime,
    parse_optional_date, text_value,
};
use crate::repos::audit::AuditEvent;
use crate::repos::diagnostic::find_diagnostic;
use crate::service::WorkflowService;
use crate::updates::ReviewUpdate;

const SELECT_COLS: &str = "id, movement_id, pending_transaction, assigned_plate_id, verdict_id, \
                           note, reviewed_on, created_by, created_at, updated_at";

fn row_to_review(row: &libsql::Row, catalog: &Catalog) -> Result<SupervisorReview, DatabaseError> {
    Ok(SupervisorReview {
        id: row.get(0)?,
        movement_id: row.get(1)?,
        pending_transaction: get_bool(row, 2)?,
        assigned_plate_id: get_opt_string(row, 3)?,
        verdict: catalog.stage_of(row.get::<i64>(4)?)?,
        note: get_opt_string(row, 5)?,
        reviewed_on: parse_optional_date(get_opt_string(row, 6)?.as_deref())?,
        created_by: get_opt_string(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        updated_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

pub(crate) async fn find_review(
    conn: &libsql::Connection,
    movement_id: &str,
    catalog: &Catalog,
) -> Result<Option<SupervisorReview>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM supervisor_reviews WHERE movement_id = ?1"),
            [movement_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_review(&row, catalog)?)),
        None => Ok(None),
    }
}

impl WorkflowService {
    /// INSERT a review row. A missing verdict is stored as pending.
    pub(crate) async fn insert_review_row(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        movement_id: &str,
        update: &ReviewUpdate,
        rule: Option<&str>,
    ) -> Result<SupervisorReview, DatabaseError> {
        let verdict = update.verdict.unwrap_or(StageStatus::Pending);
        let verdict_id = self.catalog().stage_id(verdict)?;
        let now = self.now();
        let id = generate_id_on(conn, PREFIX_REVIEW).await?;
        let review = SupervisorReview {
            id: id.clone(),
            movement_id: movement_id.to_string(),
            pending_transaction: update.pending_transaction.unwrap_or(false),
            assigned_plate_id: update.assigned_plate_id.clone().flatten(),
            verdict,
            note: update.note.clone().flatten(),
            reviewed_on: update.reviewed_on.flatten(),
            created_by: actor.map(String::from),
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            "INSERT INTO supervisor_reviews (id, movement_id, pending_transaction, assigned_plate_id, verdict_id,
                                             note, reviewed_on, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            libsql::params![
                id.as_str(),
                movement_id,
                i64::from(review.pending_transaction),
                text_value(review.assigned_plate_id.clone()),
                verdict_id,
                text_value(review.note.clone()),
                text_value(review.reviewed_on.map(format_date)),
                actor,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )
        .await
        .map_err(|e| map_stage_insert_error(e, EntityType::Review, movement_id))?;

        let event = match rule {
            Some(rule) => AuditEvent::new(EntityType::Review, &id, AuditAction::AutoCreated)
                .detail(&AutoCreatedDetail { rule: rule.to_string() })?,
            None => AuditEvent::new(EntityType::Review, &id, AuditAction::Created),
        };
        self.record_audit(conn, actor, event.movement(movement_id)).await?;
        Ok(review)
    }

    async fn update_review_row(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        existing: &SupervisorReview,
        update: &ReviewUpdate,
    ) -> Result<(), DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(pending) = update.pending_transaction {
            params.push(i64::from(pending).into());
            sets.push(format!("pending_transaction = ?{}", params.len()));
        }
        if let Some(ref plate) = update.assigned_plate_id {
            params.push(text_value(plate.clone()));
            sets.push(format!("assigned_plate_id = ?{}", params.len()));
        }
        if let Some(verdict) = update.verdict {
            params.push(self.catalog().stage_id(verdict)?.into());
            sets.push(format!("verdict_id = ?{}", params.len()));
        }
        if let Some(ref note) = update.note {
            params.push(text_value(note.clone()));
            sets.push(format!("note = ?{}", params.len()));
        }
        if let Some(reviewed_on) = update.reviewed_on {
            params.push(text_value(reviewed_on.map(format_date)));
            sets.push(format!("reviewed_on = ?{}", params.len()));
        }

        params.push(self.now().to_rfc3339().into());
        sets.push(format!("updated_at = ?{}", params.len()));
        params.push(existing.id.clone().into());
        let sql = format!(
            "UPDATE supervisor_reviews SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );
        conn.execute(&sql, libsql::params_from_iter(params)).await?;

        let action = match update.verdict {
            Some(verdict) if verdict != existing.verdict => AuditAction::StatusChanged,
            _ => AuditAction::Updated,
        };
        self.record_audit(
            conn,
            actor,
            AuditEvent::new(EntityType::Review, &existing.id, action)
                .movement(&existing.movement_id)
                .detail(update)?,
        )
        .await?;
        Ok(())
    }

    /// Create the supervisor review of a field movement.
    ///
    /// # Errors
    ///
    /// - `WorkflowError::NotFound` if the movement does not exist.
    /// - `WorkflowError::EditLocked` if the movement is closed.
    /// - `WorkflowError::GuardViolation` if the movement is not a field intake.
    /// - `WorkflowError::DuplicateStage` if the movement already has a review.
    pub async fn insert_review(
        &self,
        actor: Option<&str>,
        movement_id: &str,
        update: ReviewUpdate,
    ) -> Result<SupervisorReview, DatabaseError> {
        let tx = self.begin_write().await?;
        let result = self.insert_review_in(&tx, actor, movement_id, &update).await;
        tx.finish(result).await
    }

    async fn insert_review_in(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        movement_id: &str,
        update: &ReviewUpdate,
    ) -> Result<SupervisorReview, DatabaseError> {
        let movement = self.load_movement(conn, movement_id).await?;
        self.check_lock(&movement, true)?;
        workflow::check_stage_origin(EntityType::Review, movement_id, movement.origin)?;
        let review = self
            .insert_review_row(conn, actor, movement_id, update, None)
            .await?;
        self.propagate_review(conn, actor, &movement).await?;
        Ok(review)
    }

    /// Create or update the supervisor review of a field movement.
    ///
    /// # Errors
    ///
    /// - `WorkflowError::NotFound` if the movement does not exist.
    /// - `WorkflowError::EditLocked` if the movement is closed.
    /// - `WorkflowError::GuardViolation` if the movement is not a field intake.
    /// - `WorkflowError::DuplicateStage` if a concurrent writer created it first.
    pub async fn record_review(
        &self,
        actor: Option<&str>,
        movement_id: &str,
        update: ReviewUpdate,
    ) -> Result<SupervisorReview, DatabaseError> {
        let tx = self.begin_write().await?;
        let result = self.record_review_in(&tx, actor, movement_id, &update).await;
        tx.finish(result).await
    }

    async fn record_review_in(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        movement_id: &str,
        update: &ReviewUpdate,
    ) -> Result<SupervisorReview, DatabaseError> {
        let movement = self.load_movement(conn, movement_id).await?;
        let existing = find_review(conn, movement_id, self.catalog()).await?;
        self.check_lock(&movement, existing.is_none())?;
        workflow::check_stage_origin(EntityType::Review, movement_id, movement.origin)?;

        match existing {
            Some(ref existing) if update.is_empty() => return Ok(existing.clone()),
            Some(ref existing) => {
                self.update_review_row(conn, actor, existing, update).await?;
            }
            None => {
                self.insert_review_row(conn, actor, movement_id, update, None)
                    .await?;
            }
        }

        self.propagate_review(conn, actor, &movement).await?;
        find_review(conn, movement_id, self.catalog())
            .await?
            .ok_or(DatabaseError::NoResult)
    }

    /// Apply the current review verdict to the movement.
    ///
    /// Runs after every diagnostic or review write. Idempotent: re-running with
    /// an unchanged verdict writes nothing.
    pub(crate) async fn propagate_review(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        movement: &Movement,
    ) -> Result<(), DatabaseError> {
        if !movement.origin.requires_review() {
            return Ok(());
        }
        let Some(review) = find_review(conn, &movement.id, self.catalog()).await? else {
            return Ok(());
        };
        let diagnostic_complete = find_diagnostic(conn, &movement.id)
            .await?
            .is_some_and(|d| d.is_complete());

        match workflow::review_outcome(review.verdict, diagnostic_complete) {
            ReviewOutcome::MarkNotOperational => {
                self.set_final_status(
                    conn,
                    actor,
                    movement,
                    FinalStatus::NotOperational,
                    rules::REVIEW_NOT_OK,
                )
                .await?;
            }
            ReviewOutcome::OpenPreparation => {
                self.ensure_preparation(conn, actor, &movement.id).await?;
            }
            ReviewOutcome::Hold => {
                tracing::debug!(
                    movement_id = %movement.id,
                    verdict = %review.verdict,
                    diagnostic_complete,
                    "review outcome on hold"
                );
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `WorkflowError::NotFound` if the movement has no review.
    pub async fn get_review(&self, movement_id: &str) -> Result<SupervisorReview, DatabaseError> {
        let _gate = self.read_gate().await;
        find_review(self.db().conn(), movement_id, self.catalog())
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityType::Review, movement_id).into())
    }
}
