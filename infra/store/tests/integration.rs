use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use zb_store::{Store, StoreError};

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Snapshot {
    items: Vec<String>,
}

async fn store(temp: &TempDir) -> Store {
    Store::builder().root(temp.path().join("data")).connect().await.unwrap()
}

#[tokio::test]
async fn path_traversal_is_blocked() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;

    assert!(store.resolve("../etc/passwd").is_err());
    assert!(store.resolve("foo/../../bar").is_err());
    assert!(store.resolve("/etc/passwd").is_err());
}

#[tokio::test]
async fn missing_document_loads_as_default() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;

    let snapshot: Snapshot = store.load("queue.json").await.unwrap();
    assert_eq!(snapshot, Snapshot::default());
    assert!(!store.exists("queue.json").unwrap());
}

#[tokio::test]
async fn save_replaces_whole_document() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;

    let first = Snapshot { items: vec!["a".into(), "b".into()] };
    store.save("queue.json", &first).await.unwrap();
    let second = Snapshot { items: vec!["c".into()] };
    store.save("queue.json", &second).await.unwrap();

    let loaded: Snapshot = store.load("queue.json").await.unwrap();
    assert_eq!(loaded, second);

    let leftovers: Vec<_> = std::fs::read_dir(store.root())
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().contains(".zbtmp."))
        .collect();
    assert!(leftovers.is_empty(), "temp files must be renamed away");
}

#[tokio::test]
async fn corrupt_document_is_a_json_error() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;

    store.write("queue.json", b"{ not json").await.unwrap();
    let err = store.load::<Snapshot>("queue.json").await.expect_err("decode must fail");
    assert!(matches!(err, StoreError::Json { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn nested_paths_create_parents() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;

    store.write("archive/2025/queue.json", b"[]").await.unwrap();
    assert_eq!(store.read("archive/2025/queue.json").await.unwrap(), b"[]");
}

#[tokio::test]
async fn delete_and_read_missing() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;

    store.write("customers.json", b"[]").await.unwrap();
    store.delete("customers.json").await.unwrap();

    assert!(matches!(
        store.read("customers.json").await,
        Err(StoreError::FileNotFound { .. })
    ));
    assert!(matches!(
        store.delete("customers.json").await,
        Err(StoreError::FileNotFound { .. })
    ));
}

#[tokio::test]
async fn connect_without_create_requires_existing_root() {
    let temp = TempDir::new().unwrap();
    let err = Store::builder()
        .root(temp.path().join("absent"))
        .create(false)
        .connect()
        .await
        .expect_err("missing root must fail");
    assert!(matches!(err, StoreError::Io { .. }));
}
