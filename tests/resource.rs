//! Integration tests for the content-addressed resource model, exercised the way a caller outside the crate would: through
//! `ResourceManager`'s public API only.

use originals::resource::{
    hash_content, infer_resource_type, CreateOptions, ResourceKind, ResourceManager, UpdateOptions,
};
use originals::Error;

#[test]
fn a_resource_chain_grows_by_one_version_per_change() {
    let mut rm = ResourceManager::new();
    let v1 = rm
        .create_resource(
            b"Hello",
            CreateOptions { content_type: "text/plain".into(), id: Some("doc".into()), ..Default::default() },
        )
        .expect("should create");

    let err = rm.update_resource("doc", b"Hello", UpdateOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Integrity(_)), "unchanged content must be rejected");

    let v2 = rm.update_resource("doc", b"Hello, world", UpdateOptions::default()).expect("should update");
    let v3 = rm.update_resource("doc", b"Hello, world!", UpdateOptions::default()).expect("should update");

    assert_eq!(v2.version, 2);
    assert_eq!(v3.version, 3);
    assert_eq!(v2.previous_version_hash, Some(v1.hash.clone()));
    assert_eq!(v3.previous_version_hash, Some(v2.hash.clone()));

    rm.verify_version_chain("doc").expect("chain should verify");

    let history = rm.get_resource_history("doc");
    assert_eq!(history, vec![v1.clone(), v2.clone(), v3.clone()]);

    assert_eq!(rm.get_current_version("doc"), Some(v3.clone()));
    assert_eq!(rm.get_resource_version("doc", 1), Some(v1.clone()));
    assert_eq!(rm.get_resource_by_hash(&v2.hash), Some(v2));
}

#[test]
fn mime_allow_list_and_size_limit_are_enforced() {
    let mut rm = ResourceManager::new()
        .with_allowed_mime_types(vec!["text/plain".to_string()])
        .with_max_size(4);

    let rejected_type = rm.create_resource(
        b"abcd",
        CreateOptions { content_type: "application/json".into(), ..Default::default() },
    );
    assert!(matches!(rejected_type, Err(Error::Input(_))));

    let rejected_size = rm.create_resource(
        b"abcde",
        CreateOptions { content_type: "text/plain".into(), ..Default::default() },
    );
    assert!(matches!(rejected_size, Err(Error::Input(_))));

    let accepted = rm
        .create_resource(b"abcd", CreateOptions { content_type: "text/plain".into(), ..Default::default() })
        .expect("4-byte text/plain resource should be accepted");
    assert_eq!(accepted.size, 4);
}

#[test]
fn validate_resource_catches_structural_breaks() {
    let rm = ResourceManager::new();

    let mut resource = rm
        .clone()
        .create_resource(b"data", CreateOptions { content_type: "text/plain".into(), ..Default::default() })
        .expect("should create");
    rm.validate_resource(&resource).expect("freshly created resource should validate");

    resource.hash = "not-hex".to_string();
    assert!(matches!(rm.validate_resource(&resource), Err(Error::Input(_))));

    resource.hash = hash_content(b"data");
    resource.version = 2;
    assert!(
        matches!(rm.validate_resource(&resource), Err(Error::Input(_))),
        "v2 without previousVersionHash must fail"
    );
}

#[test]
fn embedded_content_hash_mismatch_is_an_integrity_error() {
    use originals::resource::Content;

    let rm = ResourceManager::new();
    let mut resource = rm
        .clone()
        .create_resource(b"data", CreateOptions { content_type: "text/plain".into(), ..Default::default() })
        .expect("should create");
    resource.content = Some(Content::Text("different content".to_string()));

    let err = rm.validate_resource(&resource).unwrap_err();
    assert!(matches!(err, Error::Integrity(_)));
}

#[test]
fn export_import_round_trips_a_multi_version_chain() {
    let mut rm = ResourceManager::new();
    rm.create_resource(
        b"v1",
        CreateOptions { content_type: "text/plain".into(), id: Some("doc".into()), ..Default::default() },
    )
    .expect("should create");
    rm.update_resource("doc", b"v2", UpdateOptions::default()).expect("should update");

    let exported = rm.export_resources();
    assert_eq!(exported.len(), 2);

    let mut rm2 = ResourceManager::new();
    for resource in exported.clone() {
        rm2.import_resource(resource).expect("should import in order");
    }
    assert_eq!(rm2.export_resources(), exported);
    rm2.verify_version_chain("doc").expect("imported chain should verify");
}

#[test]
fn infer_resource_type_covers_the_documented_tag_set() {
    assert_eq!(infer_resource_type("image/png"), ResourceKind::Image);
    assert_eq!(infer_resource_type("text/plain"), ResourceKind::Text);
    assert_eq!(infer_resource_type("text/x-rust"), ResourceKind::Code);
    assert_eq!(infer_resource_type("application/json"), ResourceKind::Data);
    assert_eq!(infer_resource_type("audio/mpeg"), ResourceKind::Audio);
    assert_eq!(infer_resource_type("video/mp4"), ResourceKind::Video);
    assert_eq!(infer_resource_type("application/pdf"), ResourceKind::Document);
    assert_eq!(infer_resource_type("application/octet-stream"), ResourceKind::Binary);
    assert_eq!(infer_resource_type("application/x-unknown-widget"), ResourceKind::Other);
}

#[test]
fn deleting_a_resource_removes_its_whole_chain() {
    let mut rm = ResourceManager::new();
    rm.create_resource(
        b"data",
        CreateOptions { content_type: "text/plain".into(), id: Some("doc".into()), ..Default::default() },
    )
    .expect("should create");
    assert!(rm.delete_resource("doc"));
    assert!(rm.get_current_version("doc").is_none());
    assert!(!rm.delete_resource("doc"), "deleting twice reports the absence");
}
