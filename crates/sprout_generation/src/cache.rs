//! Read-through generation cache.

use crate::prompt::{recommendations_prompt, study_plan_prompt};
use crate::ResponseSanitizer;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sprout_cache::{CacheEntry, CacheKey};
use sprout_config::{CacheSettings, GenerationSettings};
use sprout_core::{ContentRecommendation, GeneratedStudyPlan, GenerationRequest, RecommendationRequest};
use sprout_error::{GenerationError, GenerationErrorKind, SproutResult};
use sprout_interface::{CacheStore, ModelClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Generates content through the model, serving repeated requests from a
/// cache.
///
/// A fresh cache hit never calls the model. The cache is best effort: a
/// failing store is logged and treated as a miss, never surfaced. Model,
/// timeout and parse failures are surfaced and nothing is cached for them.
///
/// Concurrent misses on the same key may both call the model; the last
/// write wins.
#[derive(Clone)]
pub struct GenerationCache {
    store: Arc<dyn CacheStore>,
    model: Arc<dyn ModelClient>,
    enabled: bool,
    ttl_seconds: u64,
    timeout: Duration,
}

impl std::fmt::Debug for GenerationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationCache")
            .field("model", &self.model.model_name())
            .field("enabled", &self.enabled)
            .field("ttl_seconds", &self.ttl_seconds)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GenerationCache {
    /// Create a cache over `store` that generates with `model`.
    pub fn new(
        store: Arc<dyn CacheStore>,
        model: Arc<dyn ModelClient>,
        cache: &CacheSettings,
        generation: &GenerationSettings,
    ) -> Self {
        Self {
            store,
            model,
            enabled: *cache.enabled(),
            ttl_seconds: *cache.ttl_seconds(),
            timeout: generation.timeout(),
        }
    }

    /// Model used on a miss.
    pub fn model(&self) -> &Arc<dyn ModelClient> {
        &self.model
    }

    /// Study plan for `request`, from the cache when a fresh entry exists.
    ///
    /// # Errors
    ///
    /// Returns a generation error if the model fails or exceeds the
    /// deadline, and a parse error if its response holds no usable JSON.
    #[instrument(skip(self, request), fields(subject = %request.subject, child_age = request.child_age))]
    pub async fn get_or_generate(&self, request: &GenerationRequest) -> SproutResult<GeneratedStudyPlan> {
        let key = CacheKey::for_study_plan(request);
        self.read_through(&key, &study_plan_prompt(request), |raw| {
            ResponseSanitizer::parse(raw, request)
        })
        .await
    }

    /// Recommendations for `request`, from the cache when a fresh entry
    /// exists.
    ///
    /// # Errors
    ///
    /// Same as [`GenerationCache::get_or_generate`].
    #[instrument(skip(self, request), fields(subject = %request.subject, topic = %request.topic))]
    pub async fn get_or_generate_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> SproutResult<Vec<ContentRecommendation>> {
        let key = CacheKey::for_recommendations(request);
        self.read_through(&key, &recommendations_prompt(request), |raw| {
            ResponseSanitizer::parse_recommendations(raw)
        })
        .await
    }

    async fn read_through<T, F>(&self, key: &CacheKey, prompt: &str, parse: F) -> SproutResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&str) -> SproutResult<T>,
    {
        let store_key = key.as_store_key();

        if self.enabled {
            if let Some(hit) = self.lookup::<T>(key, &store_key).await {
                info!(key = %store_key, "Cache hit");
                return Ok(hit);
            }
            debug!(key = %store_key, "Cache miss");
        }

        let raw = self.call_model(prompt).await?;
        let value = parse(&raw)?;

        if self.enabled {
            self.save(key, &store_key, &value).await;
        }
        Ok(value)
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &CacheKey, store_key: &str) -> Option<T> {
        let stored = match self.store.get(store_key).await {
            Ok(stored) => stored?,
            Err(e) => {
                warn!(key = %store_key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry<T>>(&stored) {
            Ok(entry) if entry.request_digest() != key.digest() => {
                warn!(key = %store_key, "Cache entry digest mismatch, discarding");
            }
            Ok(entry) if !entry.is_fresh(Utc::now()) => {
                debug!(key = %store_key, expires_at = %entry.expires_at(), "Cache entry expired");
            }
            Ok(entry) => return Some(entry.into_response()),
            Err(e) => {
                warn!(key = %store_key, error = %e, "Cache entry corrupt, discarding");
            }
        }

        if let Err(e) = self.store.delete(store_key).await {
            warn!(key = %store_key, error = %e, "Failed to delete stale cache entry");
        }
        None
    }

    async fn save<T: Serialize>(&self, key: &CacheKey, store_key: &str, value: &T) {
        let entry = CacheEntry::new(store_key, value, key.digest(), Utc::now(), self.ttl_seconds);
        let serialized = match serde_json::to_string(&entry) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!(key = %store_key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };
        match self.store.set(store_key, serialized, self.ttl_seconds).await {
            Ok(()) => debug!(key = %store_key, ttl_seconds = self.ttl_seconds, "Cached response"),
            Err(e) => warn!(key = %store_key, error = %e, "Cache write failed"),
        }
    }

    async fn call_model(&self, prompt: &str) -> SproutResult<String> {
        debug!(
            provider = self.model.provider_name(),
            model = self.model.model_name(),
            prompt_len = prompt.len(),
            "Calling model"
        );
        let raw = tokio::time::timeout(self.timeout, self.model.generate(prompt))
            .await
            .map_err(|_| {
                GenerationError::new(GenerationErrorKind::Timeout {
                    seconds: self.timeout.as_secs(),
                })
            })??;

        if raw.trim().is_empty() {
            return Err(GenerationError::new(GenerationErrorKind::EmptyResponse).into());
        }
        Ok(raw)
    }
}
