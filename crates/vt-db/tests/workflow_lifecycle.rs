//! Workflow lifecycle integration tests
//!
//! Drives `WorkflowService` through its public API only:
//! - Intake: stage records per origin
//! - Review propagation: rejection, approval, idempotent re-runs
//! - Preparation: entry gate, final-status effect, plate invariant
//! - Guards: origin guard, edit lock (updates and inserts), duplicate races
//! - Catalog misconfiguration and config-driven construction
//! - The field end-to-end example

use std::sync::Arc;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use vt_config::{CatalogConfig, ValtrackConfig};
use vt_core::clock::FixedClock;
use vt_core::entities::MovementStages;
use vt_core::enums::{AuditAction, CatalogKind, EntityType, FinalStatus, MovementState, Origin, StageStatus};
use vt_core::errors::WorkflowError;
use vt_db::error::DatabaseError;
use vt_db::repos::audit::AuditFilter;
use vt_db::repos::movement::MovementFilter;
use vt_db::service::WorkflowService;
use vt_db::updates::{
    DiagnosticUpdateBuilder, MovementUpdateBuilder, PreparationUpdateBuilder, ReviewUpdateBuilder,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn service_at(today: NaiveDate) -> (WorkflowService, FixedClock) {
    let clock = FixedClock::at_date(today);
    let svc = WorkflowService::new_local(":memory:", &CatalogConfig::default(), Arc::new(clock.clone()))
        .await
        .unwrap();
    (svc, clock)
}

async fn intake(svc: &WorkflowService, hardware_id: &str, origin: Origin) -> MovementStages {
    let validator = svc
        .create_validator(Some("admin"), hardware_id, "bus")
        .await
        .unwrap();
    svc.open_movement(Some("tech-1"), &validator.id, date(2024, 1, 1), origin)
        .await
        .unwrap()
}

async fn count(svc: &WorkflowService, table: &str, movement_id: &str) -> i64 {
    let mut rows = svc
        .db()
        .conn()
        .query(
            &format!("SELECT count(*) FROM {table} WHERE movement_id = ?1"),
            [movement_id],
        )
        .await
        .unwrap();
    rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
}

fn rejection(err: &DatabaseError) -> &WorkflowError {
    err.workflow()
        .unwrap_or_else(|| panic!("expected a workflow rejection, got {err}"))
}

async fn complete_diagnostic(svc: &WorkflowService, movement_id: &str) {
    svc.record_diagnostic(
        Some("tech-1"),
        movement_id,
        DiagnosticUpdateBuilder::new()
            .has_fault(true)
            .is_connected(true)
            .build(),
    )
    .await
    .unwrap();
}

async fn set_verdict(svc: &WorkflowService, movement_id: &str, verdict: StageStatus) {
    svc.record_review(
        Some("sup-1"),
        movement_id,
        ReviewUpdateBuilder::new().verdict(verdict).build(),
    )
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Intake
// ---------------------------------------------------------------------------

#[tokio::test]
async fn field_intake_creates_one_diagnostic_and_one_pending_review() {
    let (svc, _) = service_at(date(2024, 1, 1)).await;
    let stages = intake(&svc, "HW-1", Origin::Field).await;
    let id = &stages.movement.id;

    assert_eq!(count(&svc, "diagnostics", id).await, 1);
    assert_eq!(count(&svc, "supervisor_reviews", id).await, 1);
    assert_eq!(count(&svc, "preparations", id).await, 0);
    assert_eq!(svc.get_review(id).await.unwrap().verdict, StageStatus::Pending);
}

#[tokio::test]
async fn non_field_intake_creates_one_pending_preparation() {
    let (svc, _) = service_at(date(2024, 1, 1)).await;
    for (hw, origin) in [("HW-1", Origin::Warranty), ("HW-2", Origin::New)] {
        let stages = intake(&svc, hw, origin).await;
        let id = &stages.movement.id;
        assert_eq!(count(&svc, "diagnostics", id).await, 0);
        assert_eq!(count(&svc, "supervisor_reviews", id).await, 0);
        assert_eq!(count(&svc, "preparations", id).await, 1);
        assert_eq!(
            svc.get_preparation(id).await.unwrap().status,
            StageStatus::Pending
        );
    }
}

// ---------------------------------------------------------------------------
// Review propagation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_review_marks_not_operational_without_preparation() {
    let (svc, _) = service_at(date(2024, 1, 2)).await;
    let id = intake(&svc, "HW-1", Origin::Field).await.movement.id;
    complete_diagnostic(&svc, &id).await;
    set_verdict(&svc, &id, StageStatus::NotOk).await;

    let stages = svc.get_movement_stages(&id).await.unwrap();
    assert_eq!(stages.movement.final_status, Some(FinalStatus::NotOperational));
    assert!(stages.preparation.is_none());
}

#[tokio::test]
async fn approval_opens_exactly_one_preparation_across_reruns() {
    let (svc, _) = service_at(date(2024, 1, 2)).await;
    let id = intake(&svc, "HW-1", Origin::Field).await.movement.id;
    complete_diagnostic(&svc, &id).await;
    set_verdict(&svc, &id, StageStatus::Ok).await;

    let preparation = svc.get_preparation(&id).await.unwrap();
    assert_eq!(preparation.status, StageStatus::Pending);

    // Technician work on the preparation must survive re-approval.
    svc.record_preparation(
        Some("prep-1"),
        &id,
        PreparationUpdateBuilder::new()
            .technician_id(Some("tec-7".into()))
            .build(),
    )
    .await
    .unwrap();
    set_verdict(&svc, &id, StageStatus::Ok).await;
    complete_diagnostic(&svc, &id).await;

    assert_eq!(count(&svc, "preparations", &id).await, 1);
    let after = svc.get_preparation(&id).await.unwrap();
    assert_eq!(after.id, preparation.id);
    assert_eq!(after.technician_id.as_deref(), Some("tec-7"));

    let auto_created = svc
        .query_audit(&AuditFilter {
            entity_type: Some(EntityType::Preparation),
            action: Some(AuditAction::AutoCreated),
            movement_id: Some(id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(auto_created.len(), 1);
}

#[tokio::test]
async fn later_review_change_does_not_retract_final_status() {
    let (svc, _) = service_at(date(2024, 1, 2)).await;
    let id = intake(&svc, "HW-1", Origin::Field).await.movement.id;
    set_verdict(&svc, &id, StageStatus::NotOk).await;
    set_verdict(&svc, &id, StageStatus::Pending).await;

    assert_eq!(
        svc.get_movement(&id).await.unwrap().final_status,
        Some(FinalStatus::NotOperational)
    );
}

// ---------------------------------------------------------------------------
// Preparation gate and final status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn field_preparation_insert_requires_ok_review() {
    let (svc, _) = service_at(date(2024, 1, 2)).await;
    for (hw, verdict) in [("HW-1", StageStatus::Pending), ("HW-2", StageStatus::NotOk)] {
        let id = intake(&svc, hw, Origin::Field).await.movement.id;
        if verdict != StageStatus::Pending {
            set_verdict(&svc, &id, verdict).await;
        }

        let err = svc
            .insert_preparation(None, &id, PreparationUpdateBuilder::new().build())
            .await
            .unwrap_err();
        assert_eq!(
            rejection(&err),
            &WorkflowError::GateViolation {
                movement_id: id.clone(),
                verdict: Some(verdict),
            }
        );
        assert_eq!(count(&svc, "preparations", &id).await, 0);
    }
}

#[tokio::test]
async fn explicit_insert_after_approval_with_incomplete_diagnostic() {
    let (svc, _) = service_at(date(2024, 1, 2)).await;
    let id = intake(&svc, "HW-1", Origin::Field).await.movement.id;
    set_verdict(&svc, &id, StageStatus::Ok).await;
    assert_eq!(count(&svc, "preparations", &id).await, 0);

    let preparation = svc
        .insert_preparation(
            Some("prep-1"),
            &id,
            PreparationUpdateBuilder::new().status(StageStatus::NotOk).build(),
        )
        .await
        .unwrap();
    assert_eq!(preparation.status, StageStatus::NotOk);
    assert_eq!(
        svc.get_movement(&id).await.unwrap().final_status,
        Some(FinalStatus::NotOperational)
    );
}

#[tokio::test]
async fn repeated_ok_preparation_writes_one_status_change() {
    let (svc, _) = service_at(date(2024, 1, 2)).await;
    let id = intake(&svc, "HW-1", Origin::New).await.movement.id;
    for _ in 0..2 {
        svc.record_preparation(
            Some("prep-1"),
            &id,
            PreparationUpdateBuilder::new().status(StageStatus::Ok).build(),
        )
        .await
        .unwrap();
    }

    let changes = svc
        .query_audit(&AuditFilter {
            entity_type: Some(EntityType::Movement),
            action: Some(AuditAction::StatusChanged),
            movement_id: Some(id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].detail.as_ref().unwrap()["to"], "operational");
    assert_eq!(changes[0].detail.as_ref().unwrap()["rule"], "preparation_ok");
}

#[tokio::test]
async fn plate_change_without_final_plate_is_rejected() {
    let (svc, _) = service_at(date(2024, 1, 2)).await;
    let id = intake(&svc, "HW-1", Origin::Warranty).await.movement.id;
    let before = svc.get_preparation(&id).await.unwrap();

    let err = svc
        .record_preparation(
            None,
            &id,
            PreparationUpdateBuilder::new()
                .plate_changed(true)
                .final_plate_id(Some("   ".into()))
                .status(StageStatus::Ok)
                .build(),
        )
        .await
        .unwrap_err();
    assert!(matches!(rejection(&err), WorkflowError::StructuralInvariant(_)));
    assert_eq!(svc.get_preparation(&id).await.unwrap(), before);
    assert_eq!(svc.get_movement(&id).await.unwrap().final_status, None);
}

// ---------------------------------------------------------------------------
// Origin guard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn diagnostic_and_review_rejected_for_non_field_origins() {
    let (svc, _) = service_at(date(2024, 1, 2)).await;
    for (hw, origin) in [("HW-1", Origin::Warranty), ("HW-2", Origin::New)] {
        let id = intake(&svc, hw, origin).await.movement.id;

        let err = svc
            .record_diagnostic(None, &id, DiagnosticUpdateBuilder::new().has_fault(true).build())
            .await
            .unwrap_err();
        assert!(matches!(
            rejection(&err),
            WorkflowError::GuardViolation { stage: EntityType::Diagnostic, .. }
        ));

        let err = svc
            .insert_review(None, &id, ReviewUpdateBuilder::new().verdict(StageStatus::Ok).build())
            .await
            .unwrap_err();
        assert!(matches!(
            rejection(&err),
            WorkflowError::GuardViolation { stage: EntityType::Review, .. }
        ));

        assert_eq!(count(&svc, "diagnostics", &id).await, 0);
        assert_eq!(count(&svc, "supervisor_reviews", &id).await, 0);
    }
}

// ---------------------------------------------------------------------------
// Edit lock
// ---------------------------------------------------------------------------

#[tokio::test]
async fn closed_movement_rejects_every_update() {
    let (svc, clock) = service_at(date(2024, 1, 2)).await;
    let id = intake(&svc, "HW-1", Origin::Field).await.movement.id;
    complete_diagnostic(&svc, &id).await;
    set_verdict(&svc, &id, StageStatus::Ok).await;
    svc.close_movement(Some("tech-1"), &id, date(2024, 1, 10))
        .await
        .unwrap();

    // Exit date set but not yet reached: still editable.
    assert_eq!(svc.movement_state(&id).await.unwrap(), MovementState::Open);
    svc.record_preparation(
        None,
        &id,
        PreparationUpdateBuilder::new().detail(Some("bench test".into())).build(),
    )
    .await
    .unwrap();

    clock.set_date(date(2024, 1, 10));
    let before = svc.get_movement_stages(&id).await.unwrap();
    assert_eq!(before.state, MovementState::Closed);

    let errors = vec![
        svc.record_diagnostic(None, &id, DiagnosticUpdateBuilder::new().has_fault(false).build())
            .await
            .unwrap_err(),
        svc.record_review(None, &id, ReviewUpdateBuilder::new().verdict(StageStatus::NotOk).build())
            .await
            .unwrap_err(),
        svc.record_preparation(None, &id, PreparationUpdateBuilder::new().status(StageStatus::Ok).build())
            .await
            .unwrap_err(),
        svc.update_movement(None, &id, MovementUpdateBuilder::new().shipment_type(Some("Despacho".into())).build())
            .await
            .unwrap_err(),
        svc.close_movement(None, &id, date(2024, 2, 1)).await.unwrap_err(),
    ];
    for err in &errors {
        assert_eq!(
            rejection(err),
            &WorkflowError::EditLocked {
                movement_id: id.clone(),
                exit_date: date(2024, 1, 10),
            }
        );
    }

    assert_eq!(svc.get_movement_stages(&id).await.unwrap(), before);
}

#[tokio::test]
async fn insert_lock_follows_configuration() {
    for lock_inserts in [true, false] {
        let clock = FixedClock::at_date(date(2024, 1, 2));
        let svc = WorkflowService::new_local(":memory:", &CatalogConfig::default(), Arc::new(clock.clone()))
            .await
            .unwrap()
            .with_insert_lock(lock_inserts);
        let id = intake(&svc, "HW-1", Origin::Field).await.movement.id;
        set_verdict(&svc, &id, StageStatus::Ok).await;
        svc.close_movement(None, &id, date(2024, 1, 3)).await.unwrap();
        clock.set_date(date(2024, 1, 5));

        let result = svc
            .insert_preparation(None, &id, PreparationUpdateBuilder::new().build())
            .await;
        if lock_inserts {
            let err = result.unwrap_err();
            assert!(matches!(rejection(&err), WorkflowError::EditLocked { .. }));
            assert_eq!(count(&svc, "preparations", &id).await, 0);
        } else {
            result.unwrap();
            assert_eq!(count(&svc, "preparations", &id).await, 1);
        }
    }
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_preparation_inserts_have_one_winner() {
    let (svc, _) = service_at(date(2024, 1, 2)).await;
    let id = intake(&svc, "HW-1", Origin::Field).await.movement.id;
    set_verdict(&svc, &id, StageStatus::Ok).await;

    let (a, b) = tokio::join!(
        svc.insert_preparation(Some("prep-1"), &id, PreparationUpdateBuilder::new().build()),
        svc.insert_preparation(Some("prep-2"), &id, PreparationUpdateBuilder::new().build()),
    );
    let results = [a, b];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);

    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    let reason = rejection(loser);
    assert_eq!(
        reason,
        &WorkflowError::DuplicateStage {
            stage: EntityType::Preparation,
            movement_id: id.clone(),
        }
    );
    assert!(reason.requires_reread());
    assert_eq!(count(&svc, "preparations", &id).await, 1);
}

// ---------------------------------------------------------------------------
// Catalog and configuration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_field_origin_fails_intake_without_writes() {
    let names = CatalogConfig {
        origin_field: "Campo".into(),
        ..CatalogConfig::default()
    };
    let svc = WorkflowService::new_local(":memory:", &names, Arc::new(FixedClock::at_date(date(2024, 1, 1))))
        .await
        .unwrap();
    let validator = svc.create_validator(None, "HW-1", "bus").await.unwrap();

    let err = svc
        .open_movement(None, &validator.id, date(2024, 1, 1), Origin::Warranty)
        .await
        .unwrap_err();
    assert_eq!(
        rejection(&err),
        &WorkflowError::Configuration {
            kind: CatalogKind::Origin,
            name: "Campo".into(),
        }
    );
    assert!(
        svc.list_movements(&MovementFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn warranty_sharing_the_field_label_is_refused_at_open() {
    let names = CatalogConfig {
        origin_warranty: "Terreno".into(),
        ..CatalogConfig::default()
    };
    let mut config = ValtrackConfig::default();
    config.catalog = names.clone();
    assert!(config.validate().is_err());

    let err = WorkflowService::new_local(":memory:", &names, Arc::new(FixedClock::at_date(date(2024, 1, 1))))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, DatabaseError::InvalidState(_)));
}

#[tokio::test]
async fn open_from_config_uses_file_and_processing_date() {
    let dir = TempDir::new().unwrap();
    let mut config = ValtrackConfig::default();
    config.database.path = dir
        .path()
        .join("nested/valtrack.db")
        .to_string_lossy()
        .into_owned();
    config.workflow.processing_date = Some(date(2024, 3, 1));

    let svc = WorkflowService::open(&config).await.unwrap();
    assert_eq!(svc.today(), date(2024, 3, 1));
    let id = intake(&svc, "HW-1", Origin::New).await.movement.id;
    drop(svc);

    let reopened = WorkflowService::open(&config).await.unwrap();
    assert_eq!(reopened.get_movement(&id).await.unwrap().origin, Origin::New);
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn field_validator_reaches_operational() {
    let (svc, clock) = service_at(date(2024, 1, 1)).await;
    let stages = intake(&svc, "HW-1", Origin::Field).await;
    let id = stages.movement.id;

    clock.set_date(date(2024, 1, 2));
    svc.record_diagnostic(
        Some("tech-1"),
        &id,
        DiagnosticUpdateBuilder::new()
            .initial_plate_id(Some("PL-100".into()))
            .has_fault(true)
            .is_connected(true)
            .build(),
    )
    .await
    .unwrap();

    clock.set_date(date(2024, 1, 3));
    svc.record_review(
        Some("sup-1"),
        &id,
        ReviewUpdateBuilder::new()
            .verdict(StageStatus::Ok)
            .assigned_plate_id(Some("PL-200".into()))
            .reviewed_on(Some(date(2024, 1, 3)))
            .build(),
    )
    .await
    .unwrap();

    let preparation = svc.get_preparation(&id).await.unwrap();
    assert_eq!(preparation.status, StageStatus::Pending);
    assert_eq!(
        preparation.detail.as_deref(),
        Some(vt_core::workflow::APPROVED_REVIEW_PREPARATION_DETAIL)
    );

    clock.set_date(date(2024, 1, 4));
    let preparation = svc
        .record_preparation(
            Some("prep-1"),
            &id,
            PreparationUpdateBuilder::new()
                .status(StageStatus::Ok)
                .plate_changed(true)
                .final_plate_id(Some("PL-200".into()))
                .prepared_on(Some(date(2024, 1, 4)))
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(preparation.status, StageStatus::Ok);

    let movement = svc
        .close_movement(Some("tech-1"), &id, date(2024, 1, 5))
        .await
        .unwrap();
    assert_eq!(movement.final_status, Some(FinalStatus::Operational));

    clock.set_date(date(2024, 1, 5));
    assert_eq!(svc.movement_state(&id).await.unwrap(), MovementState::Closed);

    let history = svc
        .query_audit(&AuditFilter {
            movement_id: Some(id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    let actions: Vec<_> = history
        .iter()
        .rev()
        .map(|e| (e.entity_type, e.action))
        .collect();
    assert_eq!(
        actions,
        vec![
            (EntityType::Movement, AuditAction::Created),
            (EntityType::Diagnostic, AuditAction::AutoCreated),
            (EntityType::Review, AuditAction::AutoCreated),
            (EntityType::Diagnostic, AuditAction::Updated),
            (EntityType::Review, AuditAction::StatusChanged),
            (EntityType::Preparation, AuditAction::AutoCreated),
            (EntityType::Preparation, AuditAction::StatusChanged),
            (EntityType::Movement, AuditAction::StatusChanged),
            (EntityType::Movement, AuditAction::Closed),
        ]
    );
}
