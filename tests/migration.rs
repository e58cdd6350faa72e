//! Integration tests for the transactional migration orchestrator: the
//! validate -> checkpoint -> execute -> complete/rollback pipeline, its
//! audit trail, and batch semantics, driven entirely through
//! `MigrationManager`'s public API.

use std::sync::{Arc, Mutex};

use originals::config::Config;
use originals::lifecycle::{Layer, LifecycleManager, Publisher};
use originals::migration::{MigrationManager, MigrationStateKind};
use originals::provider::{OrdinalsClient, StorageAdapter};
use originals::resource::{CreateOptions, Resource, ResourceManager};
use originals_keyring::KeyStore;
use originals_test_utils::{MemoryStorage, ScriptedOrdinals};

fn sample_resource(id: &str) -> Resource {
    let mut rm = ResourceManager::new();
    rm.create_resource(
        format!("content for {id}").as_bytes(),
        CreateOptions { content_type: "text/plain".to_string(), id: Some(id.to_string()), ..Default::default() },
    )
    .expect("should create resource")
}

fn configured_managers() -> (MigrationManager, LifecycleManager, Arc<MemoryStorage>, Arc<ScriptedOrdinals>) {
    let storage = Arc::new(MemoryStorage::new());
    let ordinals = Arc::new(ScriptedOrdinals::default());
    let config = Config {
        storage_adapter: Some(storage.clone() as Arc<dyn StorageAdapter>),
        ordinals_provider: Some(ordinals.clone() as Arc<dyn OrdinalsClient>),
        ..Config::default()
    };
    let lifecycle = LifecycleManager::new(config.clone(), KeyStore::new());
    let migration = MigrationManager::new(config, lifecycle.clone());
    (migration, lifecycle, storage, ordinals)
}

#[tokio::test]
async fn a_peer_to_webvh_migration_completes_and_rebinds_the_asset() {
    let (migration, lifecycle, storage, _ordinals) = configured_managers();
    let mut asset = lifecycle.create_asset(vec![sample_resource("res-1")]).await.expect("should create");

    let state = migration
        .migrate(&mut asset, Layer::Webvh, Some(Publisher::Domain("example.com".to_string())), None)
        .await
        .expect("should not error");

    assert_eq!(state.state, MigrationStateKind::Completed);
    assert_eq!(state.progress, 100);
    assert_eq!(state.target_did.as_deref(), Some(asset.id.as_str()));
    assert_eq!(asset.current_layer, Layer::Webvh);
    assert!(!storage.is_empty(), "publishing should have written through the storage adapter");

    let records = migration.audit_log_for(&state.source_did);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].final_state, MigrationStateKind::Completed);
    assert!(records[0].error.is_none());
}

#[tokio::test]
async fn a_peer_to_btco_migration_completes_via_the_ordinals_provider() {
    let (migration, lifecycle, _storage, _ordinals) = configured_managers();
    let mut asset = lifecycle.create_asset(vec![sample_resource("res-1")]).await.expect("should create");

    let state = migration.migrate(&mut asset, Layer::Btco, None, Some(12.0)).await.expect("should not error");

    assert_eq!(state.state, MigrationStateKind::Completed);
    assert_eq!(asset.current_layer, Layer::Btco);
    assert!(asset.id.starts_with("did:btco:"));
    assert_eq!(asset.provenance.migrations.last().unwrap().fee_rate, Some(12.0));
}

#[tokio::test]
async fn migrating_without_a_required_publisher_rolls_back_and_restores_the_asset() {
    let (migration, lifecycle, _storage, _ordinals) = configured_managers();
    let mut asset = lifecycle.create_asset(vec![sample_resource("res-1")]).await.expect("should create");
    let original_id = asset.id.clone();

    let state = migration.migrate(&mut asset, Layer::Webvh, None, None).await.expect("should not error");

    assert_eq!(state.state, MigrationStateKind::RolledBack);
    assert!(state.error.is_some());
    assert_eq!(asset.current_layer, Layer::Peer, "the asset must be restored to its pre-migration layer");
    assert_eq!(asset.id, original_id, "a rolled-back migration must not leave a partially rebound asset");

    let records = migration.audit_log_for(&state.source_did);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].final_state, MigrationStateKind::RolledBack);
    assert!(records[0].error.is_some());
}

#[tokio::test]
async fn inscribing_without_an_ordinals_provider_quarantines_after_a_checkpoint() {
    // No storage/ordinals configured: the webvh hop succeeds (no provider
    // required) but the subsequent btco hop fails after a checkpoint has
    // already been taken, so the asset rolls back to `webvh`, not `peer`.
    let migration_config = Config::default();
    let lifecycle = LifecycleManager::new(migration_config.clone(), KeyStore::new());
    let migration = MigrationManager::new(migration_config, lifecycle.clone());

    let mut asset = lifecycle.create_asset(vec![sample_resource("res-1")]).await.expect("should create");
    migration
        .migrate(&mut asset, Layer::Webvh, Some(Publisher::Domain("example.com".to_string())), None)
        .await
        .expect("webvh hop should not error");
    assert_eq!(asset.current_layer, Layer::Webvh);

    let state = migration.migrate(&mut asset, Layer::Btco, None, None).await.expect("should not error");

    assert!(
        matches!(state.state, MigrationStateKind::RolledBack | MigrationStateKind::Quarantined),
        "a failed btco hop must reach a terminal rollback state, got {:?}",
        state.state
    );
    assert_eq!(asset.current_layer, Layer::Webvh, "the asset must remain at its pre-attempt layer");
}

#[tokio::test]
async fn batch_migrate_stops_by_default_but_continues_on_request() {
    let (migration, lifecycle, _storage, _ordinals) = configured_managers();
    let good_a = lifecycle.create_asset(vec![sample_resource("a")]).await.expect("should create");
    let good_b = lifecycle.create_asset(vec![sample_resource("b")]).await.expect("should create");
    let bad = lifecycle.create_asset(vec![sample_resource("c")]).await.expect("should create");

    let stopped = migration
        .batch_migrate(
            vec![
                (good_a.clone(), Layer::Webvh, Some(Publisher::Domain("example.com".to_string())), None),
                (bad.clone(), Layer::Webvh, None, None),
                (good_b.clone(), Layer::Webvh, Some(Publisher::Domain("example.com".to_string())), None),
            ],
            false,
        )
        .await
        .expect("should not error");
    assert_eq!(stopped.len(), 2, "the batch must stop right after the first non-completed migration");
    assert_eq!(stopped[0].state, MigrationStateKind::Completed);
    assert_eq!(stopped[1].state, MigrationStateKind::RolledBack);

    let continued = migration
        .batch_migrate(
            vec![
                (good_a, Layer::Webvh, Some(Publisher::Domain("example.com".to_string())), None),
                (bad, Layer::Webvh, None, None),
                (good_b, Layer::Webvh, Some(Publisher::Domain("example.com".to_string())), None),
            ],
            true,
        )
        .await
        .expect("should not error");
    assert_eq!(continued.len(), 3, "continue_on_error must run every item regardless of earlier failures");
    assert_eq!(continued[0].state, MigrationStateKind::Completed);
    assert_eq!(continued[1].state, MigrationStateKind::RolledBack);
    assert_eq!(continued[2].state, MigrationStateKind::Completed);
}

#[tokio::test]
async fn migration_started_and_terminal_events_are_emitted_in_order() {
    let (migration, lifecycle, _storage, _ordinals) = configured_managers();
    let mut asset = lifecycle.create_asset(vec![sample_resource("res-1")]).await.expect("should create");

    let seen: Arc<Mutex<Vec<String>>> = Arc::default();
    let started = seen.clone();
    migration.on(
        "migration:started",
        Arc::new(move |_payload| {
            started.lock().unwrap().push("started".to_string());
        }),
    );
    let completed = seen.clone();
    migration.on(
        "migration:completed",
        Arc::new(move |_payload| {
            completed.lock().unwrap().push("completed".to_string());
        }),
    );

    migration
        .migrate(&mut asset, Layer::Webvh, Some(Publisher::Domain("example.com".to_string())), None)
        .await
        .expect("should not error");

    let order = seen.lock().unwrap().clone();
    assert_eq!(order, vec!["started".to_string(), "completed".to_string()]);
}
