//! Time-boxed response caches.
//!
//! Freshness is decided by write time alone: an entry is served while it is
//! younger than the TTL and ignored afterwards. Every failure is a miss.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait CourseCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;
    async fn set(&self, key: &str, value: &Value);
}

fn is_fresh(written_at: SystemTime, ttl: Duration) -> bool {
    match SystemTime::now().duration_since(written_at) {
        Ok(age) => age <= ttl,
        // Written "in the future" (clock skew): still inside the window.
        Err(_) => true,
    }
}

/// One `<key>.json` file per key.
pub struct FileCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        FileCache {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    async fn read_fresh(&self, path: &Path) -> std::io::Result<Option<Vec<u8>>> {
        let modified = tokio::fs::metadata(path).await?.modified()?;
        if !is_fresh(modified, self.ttl) {
            return Ok(None);
        }
        tokio::fs::read(path).await.map(Some)
    }
}

#[async_trait]
impl CourseCache for FileCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let path = self.path_for(key);
        let bytes = match self.read_fresh(&path).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                log::debug!("cache {} is stale", path.display());
                return None;
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                log::warn!("reading cache {} failed: {}", path.display(), err);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("cache {} is not valid JSON: {}", path.display(), err);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &Value) {
        let path = self.path_for(key);
        if let Err(err) = tokio::fs::create_dir_all(&self.dir).await {
            log::warn!("creating cache dir {} failed: {}", self.dir.display(), err);
            return;
        }
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("serializing cache entry {} failed: {}", key, err);
                return;
            }
        };
        if let Err(err) = tokio::fs::write(&path, bytes).await {
            log::warn!("writing cache {} failed: {}", path.display(), err);
        }
    }
}

/// In-process stand-in for [`FileCache`] with the same TTL rule.
pub struct MemoryCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (SystemTime, Value)>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        MemoryCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CourseCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.lock().ok()?;
        let (written_at, value) = entries.get(key)?;
        is_fresh(*written_at, self.ttl).then(|| value.clone())
    }

    async fn set(&self, key: &str, value: &Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), (SystemTime::now(), value.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_cache_honours_ttl() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        assert!(cache.get("courses").await.is_none());
        cache.set("courses", &json!([1, 2])).await;
        assert_eq!(cache.get("courses").await, Some(json!([1, 2])));

        let expired = MemoryCache::new(Duration::ZERO);
        expired.set("courses", &json!([1])).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(expired.get("courses").await.is_none());
    }

    #[test]
    fn future_write_times_count_as_fresh() {
        let later = SystemTime::now() + Duration::from_secs(30);
        assert!(is_fresh(later, Duration::from_secs(1)));
        let earlier = SystemTime::now() - Duration::from_secs(30);
        assert!(!is_fresh(earlier, Duration::from_secs(1)));
    }
}
