use jobwatch_common::SeenJobSet;
use jobwatch_scout::store::{JsonFileStore, SeenJobStore};

fn ids(ids: &[&str]) -> SeenJobSet {
    ids.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("seen_jobs.json"));

    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn saved_set_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("seen_jobs.json"));
    let seen = ids(&["job-2", "https://x/1", "job-1"]);

    store.save(&seen).await.unwrap();

    assert_eq!(store.load().await, seen);
}

#[tokio::test]
async fn file_is_a_pretty_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seen_jobs.json");
    let store = JsonFileStore::new(&path);

    store.save(&ids(&["b", "a"])).await.unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with('['));
    assert!(text.contains('\n'), "expected indented output: {text}");
    let parsed: Vec<String> = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, vec!["a", "b"]);
    assert!(!dir.path().join("seen_jobs.json.tmp").exists());
}

#[tokio::test]
async fn corrupt_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seen_jobs.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = JsonFileStore::new(&path);
    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn wrong_shape_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seen_jobs.json");
    std::fs::write(&path, r#"{"ids": ["a"]}"#).unwrap();

    let store = JsonFileStore::new(&path);
    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn save_overwrites_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("seen_jobs.json"));

    store.save(&ids(&["a"])).await.unwrap();
    store.save(&ids(&["a", "b"])).await.unwrap();

    assert_eq!(store.load().await, ids(&["a", "b"]));
}

#[tokio::test]
async fn save_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("nope").join("seen_jobs.json"));

    let err = store.save(&ids(&["a"])).await.unwrap_err();
    assert!(err.to_string().contains("write"), "unexpected error: {err}");
}
