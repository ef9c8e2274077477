//! Trait definitions for the pipeline's collaborators.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sprout_core::{ApprovalRequest, ApprovalStatus, SafetyRating};
use sprout_error::SproutResult;
use uuid::Uuid;

/// Generative-text backend.
///
/// Implementations hide the vendor. Any failure (network, quota, timeout) is
/// reported as a generation error; callers treat them all the same way.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send a prompt and return the raw model text.
    async fn generate(&self, prompt: &str) -> SproutResult<String>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "gemini-2.0-flash").
    fn model_name(&self) -> &str;
}

/// Key/value store with per-entry TTL.
///
/// An expired key must behave exactly like an absent one on `get`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a value.
    async fn get(&self, key: &str) -> SproutResult<Option<String>>;

    /// Write a value that expires after `ttl_seconds`.
    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> SproutResult<()>;

    /// Remove a value. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> SproutResult<()>;
}

/// Durable storage for approval requests.
#[async_trait]
pub trait ApprovalRepository: Send + Sync {
    /// Persist a newly opened request.
    async fn create(&self, request: ApprovalRequest) -> SproutResult<ApprovalRequest>;

    /// Return the request already filed for the same child, content type
    /// and content key, or persist `request` if there is none.
    ///
    /// The lookup and the insert are one atomic step. The boolean is `true`
    /// when `request` was stored. Requests without a content key are always
    /// stored.
    async fn find_or_create(&self, request: ApprovalRequest) -> SproutResult<(ApprovalRequest, bool)>;

    /// Look a request up by id.
    async fn find_by_id(&self, id: Uuid) -> SproutResult<Option<ApprovalRequest>>;

    /// All requests for a child that are still pending, oldest first.
    async fn find_pending_by_child(&self, child_id: &str) -> SproutResult<Vec<ApprovalRequest>>;

    /// Atomically move a request from pending to `status`.
    ///
    /// This is a compare-and-swap on the status: it returns the updated
    /// request, or `None` if the request does not exist or is no longer
    /// pending. Two concurrent callers can never both succeed.
    async fn transition_if_pending(
        &self,
        id: Uuid,
        status: ApprovalStatus,
        processed_at: DateTime<Utc>,
        parent_notes: Option<String>,
    ) -> SproutResult<Option<ApprovalRequest>>;
}

/// Parent-of-record lookup.
#[async_trait]
pub trait GuardianDirectory: Send + Sync {
    /// Whether `parent_id` is the parent of record for `child_id`.
    async fn is_parent_of(&self, parent_id: &str, child_id: &str) -> SproutResult<bool>;
}

/// Safety ratings of stored content, keyed by content key.
#[async_trait]
pub trait ContentRatingStore: Send + Sync {
    /// Current rating; unknown content is `Unrated`.
    async fn rating(&self, content_key: &str) -> SproutResult<SafetyRating>;

    /// Overwrite the rating.
    async fn set_rating(&self, content_key: &str, rating: SafetyRating) -> SproutResult<()>;
}
