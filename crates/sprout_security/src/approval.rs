//! Parental approval workflow.

use chrono::Utc;
use sprout_core::{
    ApprovalContentType, ApprovalRequest, ApprovalStatus, NewApprovalRequest, SafetyRating,
};
use sprout_error::{ApprovalError, ApprovalErrorKind, SproutResult};
use sprout_interface::{ApprovalRepository, ContentRatingStore, GuardianDirectory};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Records approval requests and applies parent decisions to them.
///
/// A request is created pending and moves to approved or rejected exactly
/// once. Filing a content recommendation marks unrated content
/// [`SafetyRating::Flagged`]; approving it is the only way its rating is
/// promoted to [`SafetyRating::Safe`].
#[derive(Clone)]
pub struct ApprovalWorkflow {
    repository: Arc<dyn ApprovalRepository>,
    guardians: Arc<dyn GuardianDirectory>,
    ratings: Arc<dyn ContentRatingStore>,
}

impl std::fmt::Debug for ApprovalWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalWorkflow").finish_non_exhaustive()
    }
}

impl ApprovalWorkflow {
    /// Create a workflow over the given stores.
    pub fn new(
        repository: Arc<dyn ApprovalRepository>,
        guardians: Arc<dyn GuardianDirectory>,
        ratings: Arc<dyn ContentRatingStore>,
    ) -> Self {
        Self {
            repository,
            guardians,
            ratings,
        }
    }

    /// File a new pending request.
    #[instrument(skip(self, request), fields(child_id = %request.child_id, content_type = %request.content_type))]
    pub async fn create_request(&self, request: NewApprovalRequest) -> SproutResult<ApprovalRequest> {
        let created = self.repository.create(ApprovalRequest::open(request)).await?;
        info!(request_id = %created.id(), "Approval request created");
        self.mark_flagged(&created).await;
        Ok(created)
    }

    /// File a request unless the child already has one for the same
    /// content key.
    ///
    /// The existing request is returned whatever its status, so generating
    /// the same content again never opens a second request: a pending one
    /// stays the single thing to decide, and a decided one keeps its
    /// decision.
    #[instrument(skip(self, request), fields(child_id = %request.child_id, content_type = %request.content_type))]
    pub async fn file_request(&self, request: NewApprovalRequest) -> SproutResult<ApprovalRequest> {
        let (filed, created) = self
            .repository
            .find_or_create(ApprovalRequest::open(request))
            .await?;
        if created {
            info!(request_id = %filed.id(), "Approval request created");
            self.mark_flagged(&filed).await;
        } else {
            debug!(request_id = %filed.id(), status = %filed.status(), "Reusing existing approval request");
        }
        Ok(filed)
    }

    /// Apply a parent's decision to a pending request.
    ///
    /// # Errors
    ///
    /// - [`ApprovalErrorKind::NotFound`] if no request has this id
    /// - [`ApprovalErrorKind::AlreadyProcessed`] if the request is no longer
    ///   pending, including when a concurrent decision won
    /// - [`ApprovalErrorKind::Unauthorized`] if `parent_id` is not a parent
    ///   of the request's child; the request is left unchanged
    #[instrument(skip(self, notes))]
    pub async fn process_decision(
        &self,
        request_id: Uuid,
        parent_id: &str,
        approved: bool,
        notes: Option<String>,
    ) -> SproutResult<ApprovalRequest> {
        let request = self
            .repository
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| ApprovalError::new(ApprovalErrorKind::NotFound(request_id.to_string())))?;

        if request.status().is_terminal() {
            return Err(already_processed(request_id, *request.status()).into());
        }

        if !self
            .guardians
            .is_parent_of(parent_id, request.child_id())
            .await?
        {
            warn!(child_id = %request.child_id(), "Decision attempted by non-parent");
            return Err(ApprovalError::new(ApprovalErrorKind::Unauthorized {
                parent_id: parent_id.to_string(),
                child_id: request.child_id().clone(),
            })
            .into());
        }

        let status = if approved {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Rejected
        };

        let Some(decided) = self
            .repository
            .transition_if_pending(request_id, status, Utc::now(), notes)
            .await?
        else {
            let current = self
                .repository
                .find_by_id(request_id)
                .await?
                .map(|r| *r.status())
                .unwrap_or(status);
            debug!("Lost a concurrent decision race");
            return Err(already_processed(request_id, current).into());
        };
        info!(%status, "Approval decision recorded");

        if *decided.status() == ApprovalStatus::Approved
            && *decided.content_type() == ApprovalContentType::ContentRecommendation
        {
            if let Some(key) = decided.content_key() {
                match self.ratings.set_rating(key, SafetyRating::Safe).await {
                    Ok(()) => debug!(content_key = %key, "Content promoted to safe"),
                    Err(e) => warn!(
                        content_key = %key,
                        error = %e,
                        "Failed to promote approved content rating"
                    ),
                }
            }
        }

        Ok(decided)
    }

    async fn mark_flagged(&self, request: &ApprovalRequest) {
        if *request.content_type() != ApprovalContentType::ContentRecommendation {
            return;
        }
        let Some(key) = request.content_key() else {
            return;
        };
        let result = match self.ratings.rating(key).await {
            Ok(SafetyRating::Unrated) => self.ratings.set_rating(key, SafetyRating::Flagged).await,
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(content_key = %key, error = %e, "Failed to record flagged content rating");
        }
    }

    /// Pending requests for a child, oldest first.
    #[instrument(skip(self))]
    pub async fn pending_for_child(&self, child_id: &str) -> SproutResult<Vec<ApprovalRequest>> {
        self.repository.find_pending_by_child(child_id).await
    }

    /// Look up a request by id.
    pub async fn get(&self, request_id: Uuid) -> SproutResult<Option<ApprovalRequest>> {
        self.repository.find_by_id(request_id).await
    }
}

fn already_processed(request_id: Uuid, status: ApprovalStatus) -> ApprovalError {
    ApprovalError::new(ApprovalErrorKind::AlreadyProcessed {
        request_id: request_id.to_string(),
        status: status.to_string(),
    })
}
