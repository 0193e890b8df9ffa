use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use buildstock::auth::AuthenticatedUser;
use buildstock::domain::sync::{SyncState, SyncStatus};
use buildstock::domain::types::SyncId;
use buildstock::extraction::{ExtractError, ExtractionClient, RawProduct};
use buildstock::forms::sync::TriggerSyncFormPayload;
use buildstock::models::config::SyncSettings;
use buildstock::repository::{
    DieselRepository, MaterialListQuery, MaterialReader, SyncStatusReader,
};
use buildstock::schema::system_events;
use buildstock::services::sync::{SyncRegistry, cancel_sync, trigger_sync};
use diesel::prelude::*;

mod common;

/// Extraction client answering from a fixed per-category script.
struct StaticClient {
    responses: HashMap<String, Result<Vec<RawProduct>, String>>,
}

impl StaticClient {
    fn new() -> Self {
        Self {
            responses: HashMap::new(),
        }
    }

    fn with_products(mut self, category: &str, products: Vec<RawProduct>) -> Self {
        self.responses.insert(category.to_string(), Ok(products));
        self
    }

    fn with_failure(mut self, category: &str, message: &str) -> Self {
        self.responses
            .insert(category.to_string(), Err(message.to_string()));
        self
    }
}

#[async_trait]
impl ExtractionClient for StaticClient {
    async fn fetch_category(
        &self,
        category: &str,
        _limit: u32,
    ) -> Result<Vec<RawProduct>, ExtractError> {
        match self.responses.get(category) {
            Some(Ok(products)) => Ok(products.clone()),
            Some(Err(message)) => Err(ExtractError::Api(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

fn raw(sku: &str, name: &str, price: f64) -> RawProduct {
    RawProduct {
        sku: Some(sku.to_string()),
        name: Some(name.to_string()),
        price: Some(price),
        ..RawProduct::default()
    }
}

fn settings(categories: &[&str]) -> SyncSettings {
    SyncSettings {
        source: "home_depot".to_string(),
        vendor: "Home Depot".to_string(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        per_category_limit: 10,
        synthetic_fallback: false,
    }
}

fn sample_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "user-1".to_string(),
        email: "builder@example.com".to_string(),
        name: "Sam Builder".to_string(),
    }
}

async fn wait_for_terminal(repo: &DieselRepository, sync_id: SyncId) -> SyncStatus {
    for _ in 0..400 {
        if let Some(status) = repo
            .get_sync_by_id(sync_id)
            .expect("status lookup should succeed")
        {
            if status.is_terminal() {
                return status;
            }
        }
        actix_web::rt::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("sync never reached a terminal state");
}

#[actix_web::test]
async fn full_sync_lands_materials_in_the_database() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let client: Arc<dyn ExtractionClient> = Arc::new(
        StaticClient::new()
            .with_products(
                "lumber",
                vec![raw("hd-1", "2x4 Stud", 4.5), raw("hd-2", "2x6 Stud", 6.5)],
            )
            .with_failure("drywall", "upstream returned 500")
            .with_products("roofing", vec![raw("hd-3", "Asphalt Shingle", 32.0)]),
    );
    let registry = SyncRegistry::default();

    let triggered = trigger_sync(
        TriggerSyncFormPayload::default(),
        &sample_user(),
        &repo,
        &client,
        &settings(&["lumber", "drywall", "roofing"]),
        &registry,
    )
    .expect("trigger should succeed");

    let sync_id = SyncId::parse(&triggered.sync_id).expect("valid sync id");
    let status = wait_for_terminal(&repo, sync_id).await;

    // The failing category is skipped, not fatal.
    assert_eq!(status.status, SyncState::Completed);
    assert_eq!(status.materials_count.map(|c| c.get()), Some(3));

    let (total, materials) = repo
        .list_materials(MaterialListQuery::default())
        .expect("should list materials");
    assert_eq!(total, 3);
    assert!(materials.iter().all(|m| m.source.as_str() == "home_depot"));
    assert!(materials.iter().all(|m| m.vendor.as_str() == "Home Depot"));

    let mut conn = test_db.pool().get().expect("should get connection");
    let event_types: Vec<String> = system_events::table
        .select(system_events::event_type)
        .order(system_events::id.asc())
        .load(&mut conn)
        .expect("should read events");
    assert!(event_types.contains(&"sync_started".to_string()));
    assert!(event_types.contains(&"sync_category_error".to_string()));
    assert!(event_types.contains(&"sync_completed".to_string()));
}

#[actix_web::test]
async fn resync_updates_listings_instead_of_duplicating() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let registry = SyncRegistry::default();
    let run_settings = settings(&["lumber"]);

    let first: Arc<dyn ExtractionClient> = Arc::new(
        StaticClient::new().with_products("lumber", vec![raw("hd-1", "2x4 Stud", 4.5)]),
    );
    let triggered = trigger_sync(
        TriggerSyncFormPayload::default(),
        &sample_user(),
        &repo,
        &first,
        &run_settings,
        &registry,
    )
    .expect("first trigger should succeed");
    wait_for_terminal(&repo, SyncId::parse(&triggered.sync_id).expect("valid sync id")).await;

    let second: Arc<dyn ExtractionClient> = Arc::new(
        StaticClient::new().with_products("lumber", vec![raw("hd-1", "2x4 Stud", 5.0)]),
    );
    let triggered = trigger_sync(
        TriggerSyncFormPayload::default(),
        &sample_user(),
        &repo,
        &second,
        &run_settings,
        &registry,
    )
    .expect("second trigger should succeed");
    wait_for_terminal(&repo, SyncId::parse(&triggered.sync_id).expect("valid sync id")).await;

    let (total, materials) = repo
        .list_materials(MaterialListQuery::default())
        .expect("should list materials");
    assert_eq!(total, 1);
    assert_eq!(materials[0].price.map(|p| p.get()), Some(5.0));
}

#[actix_web::test]
async fn sync_without_listings_completes_with_no_data() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let client: Arc<dyn ExtractionClient> = Arc::new(StaticClient::new());
    let registry = SyncRegistry::default();

    let triggered = trigger_sync(
        TriggerSyncFormPayload::default(),
        &sample_user(),
        &repo,
        &client,
        &settings(&["lumber", "drywall"]),
        &registry,
    )
    .expect("trigger should succeed");

    let sync_id = SyncId::parse(&triggered.sync_id).expect("valid sync id");
    let status = wait_for_terminal(&repo, sync_id).await;

    assert_eq!(status.status, SyncState::CompletedNoData);
    assert_eq!(status.materials_count.map(|c| c.get()), Some(0));
    let (total, _) = repo
        .list_materials(MaterialListQuery::default())
        .expect("should list materials");
    assert_eq!(total, 0);
}

#[actix_web::test]
async fn cancel_before_pickup_wins_over_the_run() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let client: Arc<dyn ExtractionClient> = Arc::new(
        StaticClient::new().with_products("lumber", vec![raw("hd-1", "2x4 Stud", 4.5)]),
    );
    let registry = SyncRegistry::default();

    let triggered = trigger_sync(
        TriggerSyncFormPayload::default(),
        &sample_user(),
        &repo,
        &client,
        &settings(&["lumber"]),
        &registry,
    )
    .expect("trigger should succeed");

    // The spawned run has not been polled yet, so the cancel lands first.
    let outcome = cancel_sync(&triggered.sync_id, &sample_user(), &repo)
        .expect("cancel should succeed");
    assert!(outcome.success);

    let sync_id = SyncId::parse(&triggered.sync_id).expect("valid sync id");
    let status = wait_for_terminal(&repo, sync_id).await;
    assert_eq!(status.status, SyncState::Canceled);

    actix_web::rt::time::sleep(Duration::from_millis(20)).await;
    let (total, _) = repo
        .list_materials(MaterialListQuery::default())
        .expect("should list materials");
    assert_eq!(total, 0);
}
