//! # Validation pipeline
//!
//! Wraps [`crate::lifecycle::LifecycleManager::validate_migration`] with an
//! additional DID-integrity check the lifecycle manager itself has no
//! reason to perform on its own (it operates on an in-memory asset; the
//! orchestrator additionally confirms the asset's *current* DID still
//! resolves before committing to a multi-step migration).

use crate::did::DidManager;
use crate::lifecycle::{Layer, LifecycleManager, MigrationValidation, OriginalsAsset};

/// Run the full pre-migration validation pipeline:
/// layer compatibility and resource/credential structure (delegated to
/// [`LifecycleManager::validate_migration`]), plus DID-document
/// resolvability of the asset's current DID.
pub async fn validate(
    lifecycle: &LifecycleManager, dids: &DidManager, asset: &OriginalsAsset, target: Layer,
) -> MigrationValidation {
    let mut result = match lifecycle.validate_migration(asset, target).await {
        Ok(result) => result,
        Err(e) => {
            return MigrationValidation { valid: false, errors: vec![e.to_string()], ..Default::default() }
        }
    };

    if result.valid && dids.resolve(&asset.id).await.is_none() {
        result.valid = false;
        result.errors.push(format!("source DID {} does not resolve", asset.id));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::resource::{CreateOptions, ResourceManager};
    use originals_keyring::KeyStore;

    #[tokio::test]
    async fn rejects_disallowed_transition_before_touching_dids() {
        let config = Config::default();
        let lifecycle = LifecycleManager::new(config.clone(), KeyStore::new());
        let dids = DidManager::new(config);

        let mut rm = ResourceManager::new();
        let resource = rm
            .create_resource(b"hi", CreateOptions { content_type: "text/plain".into(), ..Default::default() })
            .expect("should create resource");
        let mut asset = lifecycle.create_asset(vec![resource]).await.expect("should create asset");
        asset.current_layer = Layer::Btco;

        let result = validate(&lifecycle, &dids, &asset, Layer::Webvh).await;
        assert!(!result.valid);
    }

    #[tokio::test]
    async fn accepts_freshly_created_peer_asset_for_webvh() {
        let config = Config::default();
        let lifecycle = LifecycleManager::new(config.clone(), KeyStore::new());
        let dids = DidManager::new(config);

        let mut rm = ResourceManager::new();
        let resource = rm
            .create_resource(b"hi", CreateOptions { content_type: "text/plain".into(), ..Default::default() })
            .expect("should create resource");
        let asset = lifecycle.create_asset(vec![resource]).await.expect("should create asset");

        let result = validate(&lifecycle, &dids, &asset, Layer::Webvh).await;
        assert!(result.valid, "errors: {:?}", result.errors);
    }
}
