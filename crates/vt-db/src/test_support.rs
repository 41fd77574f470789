//! Shared test utilities for vt-db unit tests.

pub(crate) mod helpers {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use vt_config::CatalogConfig;
    use vt_core::clock::FixedClock;
    use vt_core::entities::Movement;
    use vt_core::enums::Origin;

    use crate::service::WorkflowService;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// In-memory service with the default catalog, processing date 2024-01-05.
    pub async fn test_service() -> WorkflowService {
        test_service_with_clock(date(2024, 1, 5)).await.0
    }

    /// In-memory service whose clock the test can move.
    pub async fn test_service_with_clock(today: NaiveDate) -> (WorkflowService, FixedClock) {
        let clock = FixedClock::at_date(today);
        let svc = WorkflowService::new_local(
            ":memory:",
            &CatalogConfig::default(),
            Arc::new(clock.clone()),
        )
        .await
        .unwrap();
        (svc, clock)
    }

    /// Register a validator and return its ID.
    pub async fn register_test_validator(svc: &WorkflowService, hardware_id: &str) -> String {
        svc.create_validator(Some("admin"), hardware_id, "bus")
            .await
            .unwrap()
            .id
    }

    /// Open a movement on a fresh validator with intake 2024-01-01 by `tech-1`.
    pub async fn open_test_movement(svc: &WorkflowService, origin: Origin) -> Movement {
        let hardware_id = format!("HW-{}", svc.db().generate_id("tst").await.unwrap());
        let validator_id = register_test_validator(svc, &hardware_id).await;
        svc.open_movement(Some("tech-1"), &validator_id, date(2024, 1, 1), origin)
            .await
            .unwrap()
            .movement
    }
}
