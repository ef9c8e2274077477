//! Parental approval requests.

use crate::SafetyVerdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sprout_error::{JsonError, SproutResult};
use uuid::Uuid;

/// Lifecycle state of an approval request.
///
/// `Pending` is the only non-terminal state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    /// Awaiting a parent decision
    #[default]
    Pending,
    /// Parent approved the content
    Approved,
    /// Parent rejected the content
    Rejected,
}

impl ApprovalStatus {
    /// Whether no further transition is allowed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
}

/// What kind of content an approval request gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalContentType {
    /// A whole study plan
    StudyPlan,
    /// A single content recommendation
    ContentRecommendation,
}

/// Opaque serialized snapshot of gated content.
///
/// Taken at request time so later edits to the content never change what a
/// parent approved or rejected. Decision logic never reads it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentPayload(Vec<u8>);

impl ContentPayload {
    /// Snapshot a value as JSON bytes.
    pub fn snapshot<T: Serialize>(value: &T) -> SproutResult<Self> {
        serde_json::to_vec(value)
            .map(Self)
            .map_err(|e| JsonError::new(format!("Failed to snapshot content: {}", e)).into())
    }

    /// Wrap raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the snapshot.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Input for creating an approval request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApprovalRequest {
    /// Child the content was generated for
    pub child_id: String,
    /// Subject plan the content belongs to
    pub subject_plan_id: Option<String>,
    /// Kind of gated content
    pub content_type: ApprovalContentType,
    /// Snapshot of the content
    pub content_payload: ContentPayload,
    /// Key of the content in the rating store, for recommendations
    pub content_key: Option<String>,
    /// Verdict that caused the escalation
    pub safety_verdict: SafetyVerdict,
}

/// A durable record gating content behind a parent decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ApprovalRequest {
    id: Uuid,
    child_id: String,
    subject_plan_id: Option<String>,
    content_type: ApprovalContentType,
    content_payload: ContentPayload,
    content_key: Option<String>,
    safety_verdict: SafetyVerdict,
    requested_at: DateTime<Utc>,
    status: ApprovalStatus,
    processed_at: Option<DateTime<Utc>>,
    parent_notes: Option<String>,
}

impl ApprovalRequest {
    /// Open a new request. Requests always start out pending.
    pub fn open(new: NewApprovalRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            child_id: new.child_id,
            subject_plan_id: new.subject_plan_id,
            content_type: new.content_type,
            content_payload: new.content_payload,
            content_key: new.content_key,
            safety_verdict: new.safety_verdict,
            requested_at: Utc::now(),
            status: ApprovalStatus::Pending,
            processed_at: None,
            parent_notes: None,
        }
    }

    /// Record a decision. Returns `false` and leaves the request untouched if
    /// it is not pending or `status` is not terminal.
    pub fn decide(
        &mut self,
        status: ApprovalStatus,
        processed_at: DateTime<Utc>,
        parent_notes: Option<String>,
    ) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        self.processed_at = Some(processed_at);
        self.parent_notes = parent_notes;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VerdictSource;

    fn new_request() -> ApprovalRequest {
        ApprovalRequest::open(NewApprovalRequest {
            child_id: "child-1".to_string(),
            subject_plan_id: None,
            content_type: ApprovalContentType::ContentRecommendation,
            content_payload: ContentPayload::from_bytes(b"{}".to_vec()),
            content_key: Some("https://example.com".to_string()),
            safety_verdict: SafetyVerdict::flagged(
                vec!["violence".to_string()],
                VerdictSource::Keyword,
            ),
        })
    }

    #[test]
    fn test_opens_pending() {
        let request = new_request();
        assert_eq!(*request.status(), ApprovalStatus::Pending);
        assert!(request.processed_at().is_none());
    }

    #[test]
    fn test_decide_once() {
        let mut request = new_request();
        assert!(request.decide(ApprovalStatus::Rejected, Utc::now(), Some("no".to_string())));
        assert!(!request.decide(ApprovalStatus::Approved, Utc::now(), None));
        assert_eq!(*request.status(), ApprovalStatus::Rejected);
        assert_eq!(request.parent_notes().as_deref(), Some("no"));
    }

    #[test]
    fn test_cannot_decide_back_to_pending() {
        let mut request = new_request();
        assert!(!request.decide(ApprovalStatus::Pending, Utc::now(), None));
        assert!(request.processed_at().is_none());
    }
}
