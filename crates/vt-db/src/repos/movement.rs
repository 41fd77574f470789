//! Movement repository: intake, closure, queries and the derived final status.

use chrono::NaiveDate;

use vt_core::audit_detail::{ClosedDetail, DeletedDetail, StatusChangedDetail};
use vt_core::entities::{Movement, MovementStages};
use vt_core::enums::{AuditAction, EntityType, FinalStatus, MovementState, Origin, StageStatus};
use vt_core::errors::WorkflowError;
use vt_core::ids::PREFIX_MOVEMENT;
use vt_core::workflow::{self, rules};

use crate::catalog::Catalog;
use crate::error::DatabaseError;
use crate::generate_id_on;
use crate::helpers::{
    entity_type_to_table, format_date, get_opt_string, parse_date, parse_datetime,
    parse_optional_date,
};
use crate::repos::audit::AuditEvent;
use crate::repos::diagnostic::find_diagnostic;
use crate::repos::preparation::find_preparation;
use crate::repos::review::find_review;
use crate::repos::validator::find_validator;
use crate::service::WorkflowService;
use crate::updates::{
    DiagnosticUpdate, MovementUpdate, PreparationUpdateBuilder, ReviewUpdateBuilder,
};

const SELECT_COLS: &str = "id, validator_id, intake_date, origin_id, exit_date, shipment_type_id, \
                           final_status_id, created_by, created_at, updated_at";

fn row_to_movement(row: &libsql::Row, catalog: &Catalog) -> Result<Movement, DatabaseError> {
    Ok(Movement {
        id: row.get(0)?,
        validator_id: row.get(1)?,
        intake_date: parse_date(&row.get::<String>(2)?)?,
        origin: catalog.origin_of(row.get::<i64>(3)?)?,
        exit_date: parse_optional_date(get_opt_string(row, 4)?.as_deref())?,
        shipment_type: row
            .get::<Option<i64>>(5)?
            .map(|id| catalog.shipment_type_name(id))
            .transpose()?,
        final_status: row
            .get::<Option<i64>>(6)?
            .map(|id| catalog.final_of(id))
            .transpose()?,
        created_by: get_opt_string(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        updated_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

/// Filter criteria for movement listings.
#[derive(Debug, Default)]
pub struct MovementFilter {
    pub validator_id: Option<String>,
    /// Open or closed as of the service's processing date.
    pub state: Option<MovementState>,
    pub limit: Option<u32>,
}

impl WorkflowService {
    /// Load a movement on `conn`, failing with `NotFound` if absent.
    pub(crate) async fn load_movement(
        &self,
        conn: &libsql::Connection,
        id: &str,
    ) -> Result<Movement, DatabaseError> {
        let mut rows = conn
            .query(&format!("SELECT {SELECT_COLS} FROM movements WHERE id = ?1"), [id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityType::Movement, id))?;
        row_to_movement(&row, self.catalog())
    }

    /// Register a validator's arrival and open the stages its origin calls for.
    ///
    /// Field intake opens a diagnostic and a pending supervisor review;
    /// warranty and new intake open a pending preparation.
    ///
    /// # Errors
    ///
    /// - `WorkflowError::Configuration` if the field origin or pending status
    ///   cannot be resolved, or the requested origin is unconfigured.
    /// - `WorkflowError::NotFound` if the validator is not registered.
    pub async fn open_movement(
        &self,
        actor: Option<&str>,
        validator_id: &str,
        intake_date: NaiveDate,
        origin: Origin,
    ) -> Result<MovementStages, DatabaseError> {
        let tx = self.begin_write().await?;
        let result = self
            .open_movement_in(&tx, actor, validator_id, intake_date, origin)
            .await;
        tx.finish(result).await
    }

    async fn open_movement_in(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        validator_id: &str,
        intake_date: NaiveDate,
        origin: Origin,
    ) -> Result<MovementStages, DatabaseError> {
        self.catalog().ensure_bootstrap()?;
        let origin_id = self.catalog().origin_id(origin)?;
        if find_validator(conn, validator_id).await?.is_none() {
            return Err(WorkflowError::not_found(EntityType::Validator, validator_id).into());
        }

        let now = self.now();
        let id = generate_id_on(conn, PREFIX_MOVEMENT).await?;
        conn.execute(
            "INSERT INTO movements (id, validator_id, intake_date, origin_id, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            libsql::params![
                id.as_str(),
                validator_id,
                format_date(intake_date),
                origin_id,
                actor,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )
        .await?;
        self.record_audit(
            conn,
            actor,
            AuditEvent::new(EntityType::Movement, &id, AuditAction::Created).movement(&id),
        )
        .await?;

        let movement = Movement {
            id: id.clone(),
            validator_id: validator_id.to_string(),
            intake_date,
            origin,
            exit_date: None,
            shipment_type: None,
            final_status: None,
            created_by: actor.map(String::from),
            created_at: now,
            updated_at: now,
        };
        let mut stages = MovementStages {
            state: movement.state_on(self.today()),
            movement,
            diagnostic: None,
            review: None,
            preparation: None,
        };

        let rule = if origin.requires_review() {
            rules::FIELD_INTAKE
        } else {
            rules::NON_FIELD_INTAKE
        };
        for stage in workflow::intake_stages(origin) {
            match stage {
                EntityType::Diagnostic => {
                    let diagnostic = self
                        .insert_diagnostic_row(conn, actor, &id, &DiagnosticUpdate::default(), Some(rule))
                        .await?;
                    stages.diagnostic = Some(diagnostic);
                }
                EntityType::Review => {
                    let update = ReviewUpdateBuilder::new()
                        .verdict(StageStatus::Pending)
                        .note(Some(workflow::FIELD_INTAKE_REVIEW_NOTE.to_string()))
                        .build();
                    let review = self
                        .insert_review_row(conn, actor, &id, &update, Some(rule))
                        .await?;
                    stages.review = Some(review);
                }
                EntityType::Preparation => {
                    let update = PreparationUpdateBuilder::new()
                        .status(StageStatus::Pending)
                        .detail(Some(workflow::NON_FIELD_INTAKE_PREPARATION_DETAIL.to_string()))
                        .build();
                    let preparation = self
                        .insert_preparation_row(conn, actor, &id, &update, Some(rule))
                        .await?;
                    stages.preparation = Some(preparation);
                }
                EntityType::Validator | EntityType::Movement => {}
            }
        }

        tracing::info!(movement_id = %id, validator_id, %origin, "movement opened");
        Ok(stages)
    }

    /// # Errors
    ///
    /// Returns `WorkflowError::NotFound` if the movement does not exist.
    pub async fn get_movement(&self, id: &str) -> Result<Movement, DatabaseError> {
        let _gate = self.read_gate().await;
        self.load_movement(self.db().conn(), id).await
    }

    /// Open or closed, as of the processing date.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::NotFound` if the movement does not exist.
    pub async fn movement_state(&self, id: &str) -> Result<MovementState, DatabaseError> {
        Ok(self.get_movement(id).await?.state_on(self.today()))
    }

    /// The movement with its state and whichever stage records exist.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::NotFound` if the movement does not exist.
    pub async fn get_movement_stages(&self, id: &str) -> Result<MovementStages, DatabaseError> {
        let _gate = self.read_gate().await;
        let conn = self.db().conn();
        let movement = self.load_movement(conn, id).await?;
        Ok(MovementStages {
            state: movement.state_on(self.today()),
            diagnostic: find_diagnostic(conn, id).await?,
            review: find_review(conn, id, self.catalog()).await?,
            preparation: find_preparation(conn, id, self.catalog()).await?,
            movement,
        })
    }

    /// Most recent intake first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_movements(
        &self,
        filter: &MovementFilter,
    ) -> Result<Vec<Movement>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref validator_id) = filter.validator_id {
            params.push(libsql::Value::Text(validator_id.clone()));
            conditions.push(format!("validator_id = ?{}", params.len()));
        }
        if let Some(state) = filter.state {
            params.push(libsql::Value::Text(format_date(self.today())));
            let idx = params.len();
            conditions.push(match state {
                MovementState::Open => format!("(exit_date IS NULL OR exit_date > ?{idx})"),
                MovementState::Closed => format!("(exit_date IS NOT NULL AND exit_date <= ?{idx})"),
            });
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM movements {where_clause}
             ORDER BY intake_date DESC, created_at DESC, rowid DESC LIMIT {limit}"
        );

        let _gate = self.read_gate().await;
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut movements = Vec::new();
        while let Some(row) = rows.next().await? {
            movements.push(row_to_movement(&row, self.catalog())?);
        }
        Ok(movements)
    }

    /// Correct the intake date or set the shipment type of an open movement.
    ///
    /// # Errors
    ///
    /// - `WorkflowError::EditLocked` if the movement is closed.
    /// - `WorkflowError::Configuration` for an unknown shipment type.
    /// - `WorkflowError::StructuralInvariant` if the intake would follow the exit.
    pub async fn update_movement(
        &self,
        actor: Option<&str>,
        id: &str,
        update: MovementUpdate,
    ) -> Result<Movement, DatabaseError> {
        let tx = self.begin_write().await?;
        let result = self.update_movement_in(&tx, actor, id, &update).await;
        tx.finish(result).await
    }

    async fn update_movement_in(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        id: &str,
        update: &MovementUpdate,
    ) -> Result<Movement, DatabaseError> {
        let movement = self.load_movement(conn, id).await?;
        self.check_lock(&movement, false)?;
        if update.is_empty() {
            return Ok(movement);
        }

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(intake_date) = update.intake_date {
            if movement.exit_date.is_some_and(|exit| exit < intake_date) {
                return Err(WorkflowError::StructuralInvariant(
                    "intake date would follow the exit date".into(),
                )
                .into());
            }
            params.push(format_date(intake_date).into());
            sets.push(format!("intake_date = ?{}", params.len()));
        }
        if let Some(ref shipment_type) = update.shipment_type {
            let value = match shipment_type {
                Some(name) => libsql::Value::Integer(self.catalog().shipment_type_id(name)?),
                None => libsql::Value::Null,
            };
            params.push(value);
            sets.push(format!("shipment_type_id = ?{}", params.len()));
        }

        params.push(self.now().to_rfc3339().into());
        sets.push(format!("updated_at = ?{}", params.len()));
        params.push(id.into());
        let sql = format!(
            "UPDATE movements SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );
        conn.execute(&sql, libsql::params_from_iter(params)).await?;

        self.record_audit(
            conn,
            actor,
            AuditEvent::new(EntityType::Movement, id, AuditAction::Updated)
                .movement(id)
                .detail(update)?,
        )
        .await?;
        self.load_movement(conn, id).await
    }

    /// Record the exit date. The movement is closed from that date on.
    ///
    /// # Errors
    ///
    /// - `WorkflowError::EditLocked` if the movement is already closed.
    /// - `WorkflowError::StructuralInvariant` if the exit precedes the intake.
    pub async fn close_movement(
        &self,
        actor: Option<&str>,
        id: &str,
        exit_date: NaiveDate,
    ) -> Result<Movement, DatabaseError> {
        let tx = self.begin_write().await?;
        let result = self.close_movement_in(&tx, actor, id, exit_date).await;
        tx.finish(result).await
    }

    async fn close_movement_in(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        id: &str,
        exit_date: NaiveDate,
    ) -> Result<Movement, DatabaseError> {
        let movement = self.load_movement(conn, id).await?;
        self.check_lock(&movement, false)?;
        if exit_date < movement.intake_date {
            return Err(WorkflowError::StructuralInvariant(format!(
                "exit date {exit_date} precedes intake date {}",
                movement.intake_date
            ))
            .into());
        }

        conn.execute(
            "UPDATE movements SET exit_date = ?1, updated_at = ?2 WHERE id = ?3",
            libsql::params![format_date(exit_date), self.now().to_rfc3339(), id],
        )
        .await?;

        let detail = ClosedDetail {
            exit_date,
            previous_exit_date: movement.exit_date,
        };
        self.record_audit(
            conn,
            actor,
            AuditEvent::new(EntityType::Movement, id, AuditAction::Closed)
                .movement(id)
                .detail(&detail)?,
        )
        .await?;

        tracing::info!(movement_id = %id, %exit_date, "movement exit recorded");
        self.load_movement(conn, id).await
    }

    /// Remove a movement and its stage records. Not subject to the edit lock.
    ///
    /// Returns the number of stage records removed. The audit history stays.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::NotFound` if the movement does not exist.
    pub async fn delete_movement(&self, actor: Option<&str>, id: &str) -> Result<u64, DatabaseError> {
        let tx = self.begin_write().await?;
        let result = self.delete_movement_in(&tx, actor, id).await;
        tx.finish(result).await
    }

    async fn delete_movement_in(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        id: &str,
    ) -> Result<u64, DatabaseError> {
        self.load_movement(conn, id).await?;

        let mut stage_records = 0;
        for stage in [EntityType::Diagnostic, EntityType::Review, EntityType::Preparation] {
            let table = entity_type_to_table(stage);
            stage_records += conn
                .execute(&format!("DELETE FROM {table} WHERE movement_id = ?1"), [id])
                .await?;
        }
        conn.execute("DELETE FROM movements WHERE id = ?1", [id])
            .await?;

        self.record_audit(
            conn,
            actor,
            AuditEvent::new(EntityType::Movement, id, AuditAction::Deleted)
                .movement(id)
                .detail(&DeletedDetail { stage_records })?,
        )
        .await?;

        tracing::info!(movement_id = %id, stage_records, "movement deleted");
        Ok(stage_records)
    }

    /// Write a derived final status. Writes nothing when the value is unchanged.
    ///
    /// Returns whether the stored value changed.
    pub(crate) async fn set_final_status(
        &self,
        conn: &libsql::Connection,
        actor: Option<&str>,
        movement: &Movement,
        target: FinalStatus,
        rule: &str,
    ) -> Result<bool, DatabaseError> {
        let target_id = self.catalog().final_id(target)?;
        let changed = conn
            .execute(
                "UPDATE movements SET final_status_id = ?1, updated_at = ?2
                 WHERE id = ?3 AND final_status_id IS NOT ?1",
                libsql::params![target_id, self.now().to_rfc3339(), movement.id.as_str()],
            )
            .await?;
        if changed == 0 {
            tracing::debug!(movement_id = %movement.id, %target, rule, "final status already set");
            return Ok(false);
        }

        let detail = StatusChangedDetail {
            from: movement.final_status.map(|s| s.as_str().to_string()),
            to: target.as_str().to_string(),
            rule: rule.to_string(),
        };
        self.record_audit(
            conn,
            actor,
            AuditEvent::new(EntityType::Movement, &movement.id, AuditAction::StatusChanged)
                .movement(&movement.id)
                .detail(&detail)?,
        )
        .await?;

        tracing::info!(
            movement_id = %movement.id,
            from = ?movement.final_status,
            to = %target,
            rule,
            "final status derived"
        );
        Ok(true)
    }
}
