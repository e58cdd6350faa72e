//! Integration tests for the asset lifecycle state machine:
//! create -> publish -> inscribe, forward-only enforcement, cost
//! estimation, and batch operations, all driven through `LifecycleManager`
//! with the shared test fixtures standing in for storage and Bitcoin RPC.

use originals::config::Config;
use originals::lifecycle::{BatchOptions, Confidence, Layer, LifecycleManager, Publisher};
use originals::provider::{OrdinalsClient, StorageAdapter};
use originals::resource::{CreateOptions, Resource, ResourceManager};
use originals::Error;
use originals_keyring::KeyStore;
use originals_test_utils::{MemoryStorage, ScriptedOrdinals};
use std::sync::Arc;

fn sample_resource(id: &str) -> Resource {
    let mut rm = ResourceManager::new();
    rm.create_resource(
        format!("content for {id}").as_bytes(),
        CreateOptions { content_type: "text/plain".to_string(), id: Some(id.to_string()), ..Default::default() },
    )
    .expect("should create resource")
}

fn configured_manager() -> (LifecycleManager, Arc<MemoryStorage>, Arc<ScriptedOrdinals>) {
    let storage = Arc::new(MemoryStorage::new());
    let ordinals = Arc::new(ScriptedOrdinals::default());
    let config = Config {
        storage_adapter: Some(storage.clone() as Arc<dyn StorageAdapter>),
        ordinals_provider: Some(ordinals.clone() as Arc<dyn OrdinalsClient>),
        ..Config::default()
    };
    (LifecycleManager::new(config, KeyStore::new()), storage, ordinals)
}

#[tokio::test]
async fn full_lifecycle_walks_peer_to_webvh_to_btco() {
    let (manager, storage, _ordinals) = configured_manager();

    let mut asset = manager.create_asset(vec![sample_resource("res-1")]).await.expect("should create");
    assert_eq!(asset.current_layer, Layer::Peer);
    assert_eq!(asset.credentials.len(), 1, "a ResourceCreated credential should be issued");

    manager
        .publish_to_web(&mut asset, Publisher::Domain("example.com".to_string()))
        .await
        .expect("should publish");
    assert_eq!(asset.current_layer, Layer::Webvh);
    assert!(asset.bindings.contains_key(&Layer::Webvh));
    assert!(asset.resources[0].url.is_some(), "resource should carry a published url");
    assert!(!storage.is_empty(), "publishing should write through the storage adapter");
    assert_eq!(asset.credentials.len(), 2, "a ResourceMigrated credential should follow publication");

    // Forward-only: publishing again from a non-peer layer must fail.
    let err = manager
        .publish_to_web(&mut asset, Publisher::Domain("example.com".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTransition(_)));

    manager.inscribe_on_bitcoin(&mut asset, Some(15.0)).await.expect("should inscribe");
    assert_eq!(asset.current_layer, Layer::Btco);
    assert!(asset.id.starts_with("did:btco:"));
    assert_eq!(asset.provenance.migrations.len(), 2);
    let last_migration = asset.provenance.migrations.last().unwrap();
    assert_eq!(last_migration.fee_rate, Some(15.0));
    assert!(last_migration.inscription_id.is_some());

    // Once on btco, no further migration is permitted.
    let err = manager.inscribe_on_bitcoin(&mut asset, None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidTransition(_)));

    asset.validate().expect("a fully migrated asset must still validate its invariants");
}

#[tokio::test]
async fn inscribe_without_an_ordinals_provider_is_an_external_error() {
    let manager = LifecycleManager::new(Config::default(), KeyStore::new());
    let mut asset = manager.create_asset(vec![sample_resource("res-1")]).await.expect("should create");
    let err = manager.inscribe_on_bitcoin(&mut asset, None).await.unwrap_err();
    assert!(matches!(err, Error::External(_)));
}

#[tokio::test]
async fn fee_rate_out_of_range_is_rejected() {
    let (manager, _storage, _ordinals) = configured_manager();
    let mut asset = manager.create_asset(vec![sample_resource("res-1")]).await.expect("should create");
    let err = manager.inscribe_on_bitcoin(&mut asset, Some(2_000_000.0)).await.unwrap_err();
    assert!(matches!(err, Error::Input(_)));
}

#[tokio::test]
async fn estimate_cost_matches_the_documented_scenario() {
    let (manager, _storage, _ordinals) = configured_manager();
    let asset = manager.create_asset(vec![sample_resource("res-1")]).await.expect("should create");

    let estimate = manager.estimate_cost(&asset, Layer::Btco, Some(10.0)).await.expect("should estimate");
    assert!(estimate.total_sats > 0);
    assert_eq!(estimate.fee_rate, 10.0);
    assert_eq!(estimate.breakdown.dust_value, 546);
    assert_eq!(estimate.confidence, Confidence::Medium);

    let zero = manager.estimate_cost(&asset, Layer::Webvh, None).await.expect("should estimate");
    assert_eq!(zero.total_sats, 0);
}

#[tokio::test]
async fn batch_create_preserves_indices_and_emits_a_credential_per_asset() {
    let (manager, _storage, _ordinals) = configured_manager();
    let resource_sets = vec![vec![sample_resource("a")], vec![sample_resource("b")], vec![sample_resource("c")]];

    let outcome = manager
        .batch_create_assets(resource_sets, BatchOptions { max_concurrent: 2, ..BatchOptions::default() })
        .await
        .expect("batch should succeed");

    assert_eq!(outcome.total_processed, 3);
    assert_eq!(outcome.successful.len(), 3);
    assert!(outcome.failed.is_empty());
    let mut indices: Vec<usize> = outcome.successful.iter().map(|s| s.index).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[tokio::test]
async fn single_transaction_batch_inscription_splits_fees_proportionally() {
    let (manager, _storage, _ordinals) = configured_manager();
    let small = manager.create_asset(vec![sample_resource("small")]).await.expect("should create");
    let large = manager
        .create_asset(vec![sample_resource("large-resource-with-a-longer-id-for-a-bigger-manifest")])
        .await
        .expect("should create");

    let outcome = manager
        .batch_inscribe_on_bitcoin(vec![small, large], Some(10.0), BatchOptions::default(), true)
        .await
        .expect("batch inscription should succeed");

    assert_eq!(outcome.successful.len(), 2);
    assert!(outcome.failed.is_empty());
    for success in &outcome.successful {
        assert_eq!(success.result.current_layer, Layer::Btco);
        let migration = success.result.provenance.migrations.last().unwrap();
        assert_eq!(migration.batch_id.as_deref(), Some(outcome.batch_id.as_str()));
        assert!(migration.fee_paid.is_some(), "a batch-inscribed asset must record its fee share");
    }
    let total_fee_paid: u64 = outcome
        .successful
        .iter()
        .map(|s| s.result.provenance.migrations.last().unwrap().fee_paid.unwrap())
        .sum();
    assert!(total_fee_paid > 0, "the combined inscription should charge a non-zero total fee");
}
