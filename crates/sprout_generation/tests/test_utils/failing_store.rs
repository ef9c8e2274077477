//! Cache store whose every operation fails.

use async_trait::async_trait;
use sprout_error::{CacheError, CacheErrorKind, SproutResult};
use sprout_interface::CacheStore;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct FailingCacheStore {
    pub attempts: AtomicUsize,
}

impl FailingCacheStore {
    fn fail<T>(&self) -> SproutResult<T> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::new(CacheErrorKind::Unavailable("connection refused".to_string())).into())
    }
}

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn get(&self, _key: &str) -> SproutResult<Option<String>> {
        self.fail()
    }

    async fn set(&self, _key: &str, _value: String, _ttl_seconds: u64) -> SproutResult<()> {
        self.fail()
    }

    async fn delete(&self, _key: &str) -> SproutResult<()> {
        self.fail()
    }
}
