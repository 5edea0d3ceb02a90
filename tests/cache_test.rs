use std::fs::File;
use std::time::{Duration, SystemTime};

use frissestart_cms::config::CACHE_TTL;
use frissestart_cms::core::cache::{CourseCache, FileCache};
use serde_json::json;

#[tokio::test]
async fn test_file_cache_read_after_write() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FileCache::new(dir.path().join("nested").join(".cache"), CACHE_TTL);

    assert!(cache.get("courses").await.is_none());

    let courses = json!([{ "id": 1, "slug": "excel" }, { "id": 2, "slug": "word" }]);
    cache.set("courses", &courses).await;

    assert!(cache.path_for("courses").exists());
    assert_eq!(cache.get("courses").await, Some(courses));
}

#[tokio::test]
async fn test_file_cache_overwrites_previous_generation() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FileCache::new(dir.path(), CACHE_TTL);

    cache.set("courses", &json!([1, 2, 3])).await;
    cache.set("courses", &json!([4])).await;

    assert_eq!(cache.get("courses").await, Some(json!([4])));
}

#[tokio::test]
async fn test_file_cache_expires_by_mtime() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FileCache::new(dir.path(), CACHE_TTL);
    cache.set("courses", &json!([{ "id": 1 }])).await;

    let stale = SystemTime::now() - CACHE_TTL - Duration::from_secs(1);
    File::options()
        .write(true)
        .open(cache.path_for("courses"))
        .unwrap()
        .set_modified(stale)
        .unwrap();

    assert!(cache.get("courses").await.is_none());
}

#[tokio::test]
async fn test_file_cache_corrupt_file_is_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FileCache::new(dir.path(), CACHE_TTL);
    std::fs::write(cache.path_for("courses"), b"{ not json").unwrap();

    assert!(cache.get("courses").await.is_none());
}

#[tokio::test]
async fn test_file_cache_unwritable_dir_is_swallowed() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"a file, not a directory").unwrap();
    let cache = FileCache::new(blocker.join("cache"), CACHE_TTL);

    cache.set("courses", &json!([1])).await;

    assert!(cache.get("courses").await.is_none());
}
