//! Integration tests for the in-memory oracle and key fixtures.

use keys_exist::oracle::{KeyOracle, MemoryOracle};
use keys_exist::{Error, Key, KeyId};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn memory_oracle_distinguishes_missing_from_unknown_kind() {
    let oracle = MemoryOracle::new()
        .with_key(Key::name("MyKind", "keyA"))
        .with_kind("Empty");
    let cancel = CancellationToken::new();

    assert!(oracle.key_exists(&Key::name("MyKind", "keyA"), &cancel).await.unwrap());
    assert!(!oracle.key_exists(&Key::name("MyKind", "keyZ"), &cancel).await.unwrap());
    assert!(!oracle.key_exists(&Key::name("Empty", "x"), &cancel).await.unwrap());

    let err = oracle
        .key_exists(&Key::name("Other", "keyA"), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownKind { .. }), "got {err:?}");
    assert_eq!(oracle.calls(), 4);
}

#[tokio::test]
async fn memory_oracle_kinds_are_per_namespace() {
    let oracle = MemoryOracle::new().with_namespaced_kind("tenant-a", "Book");
    let cancel = CancellationToken::new();

    let in_ns = Key::name("Book", "dune").in_namespace("tenant-a");
    assert!(!oracle.key_exists(&in_ns, &cancel).await.unwrap());

    let default_ns = Key::name("Book", "dune");
    assert!(oracle.key_exists(&default_ns, &cancel).await.is_err());
}

#[tokio::test]
async fn memory_oracle_parent_is_part_of_identity() {
    let child = Key::id("Book", 7).with_parent(Key::name("Author", "frank"));
    let oracle = MemoryOracle::new().with_key(child.clone());
    let cancel = CancellationToken::new();

    assert!(oracle.key_exists(&child, &cancel).await.unwrap());
    assert!(!oracle.key_exists(&Key::id("Book", 7), &cancel).await.unwrap());
}

#[tokio::test]
async fn delayed_lookup_observes_cancellation() {
    let key = Key::name("MyKind", "slow");
    let oracle = MemoryOracle::new()
        .with_key(key.clone())
        .with_delay(key.clone(), Duration::from_secs(30));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = oracle.key_exists(&key, &cancel).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[test]
fn keys_load_from_json() {
    let keys: Vec<Key> = serde_json::from_str(
        r#"[
            {"kind": "MyKind", "id": {"name": "keyA"}},
            {"kind": "Book", "id": {"id": 42}, "namespace": "library",
             "parent": {"kind": "Author", "id": {"name": "frank"}}}
        ]"#,
    )
    .unwrap();

    assert_eq!(keys[0], Key::name("MyKind", "keyA"));
    assert_eq!(keys[1].id, KeyId::Id(42));
    assert_eq!(keys[1].path(), "Author:'frank'/Book:42");
    assert_eq!(keys[1].to_string(), "library::Author:'frank'/Book:42");
}
