//! In-memory TTL cache store.

use async_trait::async_trait;
use sprout_config::CacheSettings;
use sprout_error::SproutResult;
use sprout_interface::CacheStore;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    stored_at: Instant,
    ttl: Duration,
}

impl StoredValue {
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() >= self.ttl
    }

    fn time_remaining(&self) -> Option<Duration> {
        self.ttl.checked_sub(self.stored_at.elapsed())
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, StoredValue>,
    access_order: Vec<String>,
}

impl Inner {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            let k = self.access_order.remove(pos);
            self.access_order.push(k);
        }
    }

    fn forget(&mut self, key: &str) {
        self.entries.remove(key);
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
    }

    fn evict_lru(&mut self) {
        if !self.access_order.is_empty() {
            let key = self.access_order.remove(0);
            tracing::debug!(key = %key, "Evicting LRU entry");
            self.entries.remove(&key);
        }
    }
}

/// Process-local [`CacheStore`] with TTL expiry and LRU eviction.
///
/// Expired entries are removed lazily when read. When the store is full the
/// least recently used entry makes room for a new key.
///
/// # Example
///
/// ```
/// use sprout_cache::InMemoryCacheStore;
/// use sprout_interface::CacheStore;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryCacheStore::new(100);
/// store.set("study-plan:abc", "{}".to_string(), 60).await?;
/// assert_eq!(store.get("study-plan:abc").await?.as_deref(), Some("{}"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct InMemoryCacheStore {
    max_entries: usize,
    inner: Mutex<Inner>,
}

impl InMemoryCacheStore {
    /// Create a store holding at most `max_entries` values.
    pub fn new(max_entries: usize) -> Self {
        tracing::debug!(max_entries, "Creating new InMemoryCacheStore");
        Self {
            max_entries: max_entries.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Create a store sized from cache settings.
    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(*settings.max_entries())
    }

    /// Remove every expired entry, returning how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, v)| v.is_expired())
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            inner.forget(key);
        }
        if !expired.is_empty() {
            tracing::info!(
                removed = expired.len(),
                remaining = inner.entries.len(),
                "Cleaned up expired cache entries"
            );
        }
        expired.len()
    }

    /// Number of stored entries, expired ones included until they are read.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::from_settings(&CacheSettings::default())
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    #[tracing::instrument(skip(self))]
    async fn get(&self, key: &str) -> SproutResult<Option<String>> {
        let mut inner = self.inner.lock().await;

        let Some(stored) = inner.entries.get(key) else {
            return Ok(None);
        };
        if stored.is_expired() {
            tracing::debug!("Cache entry expired, removing");
            inner.forget(key);
            return Ok(None);
        }

        tracing::debug!(time_remaining = ?stored.time_remaining(), "Cache hit");
        let value = stored.value.clone();
        inner.touch(key);
        Ok(Some(value))
    }

    #[tracing::instrument(skip(self, value), fields(value_len = value.len()))]
    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> SproutResult<()> {
        let mut inner = self.inner.lock().await;

        if inner.entries.len() >= self.max_entries && !inner.entries.contains_key(key) {
            inner.evict_lru();
        }

        if let Some(pos) = inner.access_order.iter().position(|k| k == key) {
            inner.access_order.remove(pos);
        }
        inner.access_order.push(key.to_string());
        inner.entries.insert(
            key.to_string(),
            StoredValue {
                value,
                stored_at: Instant::now(),
                ttl: Duration::from_secs(ttl_seconds),
            },
        );

        tracing::debug!(cache_size = inner.entries.len(), "Inserted entry into cache");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, key: &str) -> SproutResult<()> {
        self.inner.lock().await.forget(key);
        Ok(())
    }
}
