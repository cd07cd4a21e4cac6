//! Persistent TTL cache for upstream responses (weather, geocoding)

use anyhow::{Result, anyhow};
use fjall::Keyspace;
use rand::RngExt;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

pub struct PersistentCache {
    _db: fjall::Database,
    store: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

/// Spread a TTL by ±10% so entries written together don't expire together
#[must_use]
pub fn jittered(ttl: Duration) -> Duration {
    let jitter: f64 = rand::rng().random_range(0.9..1.1);
    ttl.mul_f64(jitter)
}

impl PersistentCache {
    /// Open (or create) the cache database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("cache", fjall::KeyspaceCreateOptions::default)?;
        Ok(PersistentCache {
            _db: db,
            store: items,
        })
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?
            .duration_since(UNIX_EPOCH)?
            .as_secs();
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

        if now < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key)).await??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache() -> PersistentCache {
        let dir = std::env::temp_dir().join(format!("gonow-cache-test-{}", rand::random::<u64>()));
        PersistentCache::open(dir).unwrap()
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = temp_cache();
        cache
            .put("weather:-37.81:144.96:2025-01-15", 42u32, Duration::from_secs(60))
            .await
            .unwrap();
        let hit: Option<u32> = cache.get("weather:-37.81:144.96:2025-01-15").await.unwrap();
        assert_eq!(hit, Some(42));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = temp_cache();
        cache.put("stale", "old".to_string(), Duration::ZERO).await.unwrap();
        let miss: Option<String> = cache.get("stale").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = temp_cache();
        cache.put("k", 1u8, Duration::from_secs(60)).await.unwrap();
        cache.remove("k").await.unwrap();
        let miss: Option<u8> = cache.get("k").await.unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let ttl = Duration::from_secs(1000);
        for _ in 0..50 {
            let spread = jittered(ttl).as_secs_f64();
            assert!((900.0..=1100.0).contains(&spread), "got {spread}");
        }
    }
}
