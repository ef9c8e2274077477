//! In-memory implementations of the approval-side stores.
//!
//! Suitable for tests, the CLI and single-process deployments. A durable
//! deployment supplies its own implementations of the same traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sprout_core::{ApprovalRequest, ApprovalStatus, SafetyRating};
use sprout_error::SproutResult;
use sprout_interface::{ApprovalRepository, ContentRatingStore, GuardianDirectory};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Approval requests held in a map behind a read-write lock.
///
/// [`ApprovalRepository::transition_if_pending`] checks and updates the
/// status under a single write lock, so concurrent decisions on the same
/// request cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryApprovalRepository {
    requests: RwLock<HashMap<Uuid, ApprovalRequest>>,
}

impl InMemoryApprovalRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored requests.
    pub async fn len(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Whether no request has been stored.
    pub async fn is_empty(&self) -> bool {
        self.requests.read().await.is_empty()
    }
}

#[async_trait]
impl ApprovalRepository for InMemoryApprovalRepository {
    async fn create(&self, request: ApprovalRequest) -> SproutResult<ApprovalRequest> {
        self.requests
            .write()
            .await
            .insert(*request.id(), request.clone());
        Ok(request)
    }

    async fn find_or_create(&self, request: ApprovalRequest) -> SproutResult<(ApprovalRequest, bool)> {
        let mut requests = self.requests.write().await;
        if request.content_key().is_some() {
            let existing = requests
                .values()
                .filter(|r| {
                    r.child_id() == request.child_id()
                        && r.content_type() == request.content_type()
                        && r.content_key() == request.content_key()
                })
                .max_by_key(|r| *r.requested_at());
            if let Some(existing) = existing {
                return Ok((existing.clone(), false));
            }
        }
        requests.insert(*request.id(), request.clone());
        Ok((request, true))
    }

    async fn find_by_id(&self, id: Uuid) -> SproutResult<Option<ApprovalRequest>> {
        Ok(self.requests.read().await.get(&id).cloned())
    }

    async fn find_pending_by_child(&self, child_id: &str) -> SproutResult<Vec<ApprovalRequest>> {
        let requests = self.requests.read().await;
        let mut pending: Vec<ApprovalRequest> = requests
            .values()
            .filter(|r| r.child_id() == child_id && *r.status() == ApprovalStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|r| *r.requested_at());
        Ok(pending)
    }

    async fn transition_if_pending(
        &self,
        id: Uuid,
        status: ApprovalStatus,
        processed_at: DateTime<Utc>,
        parent_notes: Option<String>,
    ) -> SproutResult<Option<ApprovalRequest>> {
        let mut requests = self.requests.write().await;
        let Some(request) = requests.get_mut(&id) else {
            return Ok(None);
        };
        if request.decide(status, processed_at, parent_notes) {
            debug!(request_id = %id, %status, "Approval request transitioned");
            Ok(Some(request.clone()))
        } else {
            Ok(None)
        }
    }
}

/// Parent-of-record links held in memory.
#[derive(Debug, Default)]
pub struct InMemoryGuardianDirectory {
    links: RwLock<HashSet<(String, String)>>,
}

impl InMemoryGuardianDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `parent_id` as a parent of `child_id`.
    pub async fn link(&self, parent_id: impl Into<String>, child_id: impl Into<String>) {
        self.links
            .write()
            .await
            .insert((parent_id.into(), child_id.into()));
    }
}

#[async_trait]
impl GuardianDirectory for InMemoryGuardianDirectory {
    async fn is_parent_of(&self, parent_id: &str, child_id: &str) -> SproutResult<bool> {
        Ok(self
            .links
            .read()
            .await
            .contains(&(parent_id.to_string(), child_id.to_string())))
    }
}

/// Content safety ratings held in memory. Unknown keys are unrated.
#[derive(Debug, Default)]
pub struct InMemoryContentRatings {
    ratings: RwLock<HashMap<String, SafetyRating>>,
}

impl InMemoryContentRatings {
    /// Create an empty rating store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentRatingStore for InMemoryContentRatings {
    async fn rating(&self, content_key: &str) -> SproutResult<SafetyRating> {
        Ok(self
            .ratings
            .read()
            .await
            .get(content_key)
            .copied()
            .unwrap_or_default())
    }

    async fn set_rating(&self, content_key: &str, rating: SafetyRating) -> SproutResult<()> {
        self.ratings
            .write()
            .await
            .insert(content_key.to_string(), rating);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::{
        ApprovalContentType, ContentPayload, NewApprovalRequest, SafetyVerdict, VerdictSource,
    };

    #[tokio::test]
    async fn test_guardian_links_are_directional() {
        let directory = InMemoryGuardianDirectory::new();
        directory.link("parent-1", "child-1").await;

        assert!(directory.is_parent_of("parent-1", "child-1").await.unwrap());
        assert!(!directory.is_parent_of("child-1", "parent-1").await.unwrap());
        assert!(!directory.is_parent_of("parent-2", "child-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_content_is_unrated() {
        let ratings = InMemoryContentRatings::new();
        assert_eq!(ratings.rating("missing").await.unwrap(), SafetyRating::Unrated);

        ratings.set_rating("known", SafetyRating::Safe).await.unwrap();
        assert_eq!(ratings.rating("known").await.unwrap(), SafetyRating::Safe);
    }

    fn keyed_request(child_id: &str, key: Option<&str>) -> ApprovalRequest {
        ApprovalRequest::open(NewApprovalRequest {
            child_id: child_id.to_string(),
            subject_plan_id: None,
            content_type: ApprovalContentType::ContentRecommendation,
            content_payload: ContentPayload::from_bytes(b"{}".to_vec()),
            content_key: key.map(str::to_string),
            safety_verdict: SafetyVerdict::flagged(vec!["gore".to_string()], VerdictSource::Keyword),
        })
    }

    #[tokio::test]
    async fn test_find_or_create_matches_child_and_key() {
        let repository = InMemoryApprovalRepository::new();

        let (first, created) = repository
            .find_or_create(keyed_request("child-1", Some("https://x.test")))
            .await
            .unwrap();
        assert!(created);

        let (again, created) = repository
            .find_or_create(keyed_request("child-1", Some("https://x.test")))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(again.id(), first.id());

        let (_, created) = repository
            .find_or_create(keyed_request("child-2", Some("https://x.test")))
            .await
            .unwrap();
        assert!(created);

        let (_, created) = repository.find_or_create(keyed_request("child-1", None)).await.unwrap();
        assert!(created);
        let (_, created) = repository.find_or_create(keyed_request("child-1", None)).await.unwrap();
        assert!(created);

        assert_eq!(repository.len().await, 4);
    }

    #[tokio::test]
    async fn test_transition_unknown_id_is_none() {
        let repository = InMemoryApprovalRepository::new();
        let result = repository
            .transition_if_pending(Uuid::new_v4(), ApprovalStatus::Approved, Utc::now(), None)
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
