//! Approval workflow tests.

use async_trait::async_trait;
use sprout_core::{
    ApprovalContentType, ApprovalStatus, ContentPayload, NewApprovalRequest, SafetyRating,
    SafetyVerdict, VerdictSource,
};
use sprout_error::{ApprovalErrorKind, SproutError, SproutErrorKind, SproutResult, CacheError, CacheErrorKind};
use sprout_interface::ContentRatingStore;
use sprout_security::{
    ApprovalWorkflow, InMemoryApprovalRepository, InMemoryContentRatings,
    InMemoryGuardianDirectory,
};
use std::sync::Arc;
use uuid::Uuid;

struct Fixture {
    workflow: ApprovalWorkflow,
    ratings: Arc<InMemoryContentRatings>,
}

async fn fixture() -> Fixture {
    let guardians = Arc::new(InMemoryGuardianDirectory::new());
    guardians.link("parent-1", "child-1").await;
    let ratings = Arc::new(InMemoryContentRatings::new());
    let workflow = ApprovalWorkflow::new(
        Arc::new(InMemoryApprovalRepository::new()),
        guardians,
        ratings.clone(),
    );
    Fixture { workflow, ratings }
}

fn recommendation_request(key: &str) -> NewApprovalRequest {
    NewApprovalRequest {
        child_id: "child-1".to_string(),
        subject_plan_id: Some("plan-1".to_string()),
        content_type: ApprovalContentType::ContentRecommendation,
        content_payload: ContentPayload::from_bytes(br#"{"title":"Battle history"}"#.to_vec()),
        content_key: Some(key.to_string()),
        safety_verdict: SafetyVerdict::flagged(vec!["violence".to_string()], VerdictSource::Keyword),
    }
}

fn approval_kind(err: &SproutError) -> &ApprovalErrorKind {
    match err.kind() {
        SproutErrorKind::Approval(e) => &e.kind,
        other => panic!("expected an approval error, got {other}"),
    }
}

#[tokio::test]
async fn test_created_requests_are_pending() -> anyhow::Result<()> {
    let f = fixture().await;
    let request = f.workflow.create_request(recommendation_request("https://a.test")).await?;

    assert_eq!(*request.status(), ApprovalStatus::Pending);
    assert!(request.processed_at().is_none());
    assert_eq!(f.workflow.get(*request.id()).await?, Some(request.clone()));
    assert_eq!(f.workflow.pending_for_child("child-1").await?, vec![request]);
    Ok(())
}

#[tokio::test]
async fn test_approval_promotes_recommendation() -> anyhow::Result<()> {
    let f = fixture().await;
    let request = f.workflow.create_request(recommendation_request("https://a.test")).await?;

    let decided = f
        .workflow
        .process_decision(*request.id(), "parent-1", true, None)
        .await?;

    assert_eq!(*decided.status(), ApprovalStatus::Approved);
    assert!(decided.processed_at().is_some());
    assert_eq!(f.ratings.rating("https://a.test").await?, SafetyRating::Safe);
    assert!(f.workflow.pending_for_child("child-1").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_rejection_keeps_notes_and_rating() -> anyhow::Result<()> {
    let f = fixture().await;
    let request = f.workflow.create_request(recommendation_request("https://b.test")).await?;

    let decided = f
        .workflow
        .process_decision(*request.id(), "parent-1", false, Some("Too graphic".to_string()))
        .await?;

    assert_eq!(*decided.status(), ApprovalStatus::Rejected);
    assert_eq!(decided.parent_notes().as_deref(), Some("Too graphic"));
    assert_eq!(f.ratings.rating("https://b.test").await?, SafetyRating::Flagged);

    let stored = f.workflow.get(*request.id()).await?.expect("stored request");
    assert_eq!(stored.parent_notes().as_deref(), Some("Too graphic"));
    Ok(())
}

#[tokio::test]
async fn test_study_plan_approval_does_not_touch_ratings() -> anyhow::Result<()> {
    let f = fixture().await;
    let mut new = recommendation_request("plan-key");
    new.content_type = ApprovalContentType::StudyPlan;
    let request = f.workflow.create_request(new).await?;

    f.workflow
        .process_decision(*request.id(), "parent-1", true, None)
        .await?;
    assert_eq!(f.ratings.rating("plan-key").await?, SafetyRating::Unrated);
    Ok(())
}

#[tokio::test]
async fn test_decisions_are_terminal() -> anyhow::Result<()> {
    let f = fixture().await;
    let request = f.workflow.create_request(recommendation_request("https://c.test")).await?;
    f.workflow
        .process_decision(*request.id(), "parent-1", false, Some("No".to_string()))
        .await?;

    let err = f
        .workflow
        .process_decision(*request.id(), "parent-1", true, Some("Changed my mind".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(
        approval_kind(&err),
        ApprovalErrorKind::AlreadyProcessed { status, .. } if status == "REJECTED"
    ));
    let stored = f.workflow.get(*request.id()).await?.expect("stored request");
    assert_eq!(*stored.status(), ApprovalStatus::Rejected);
    assert_eq!(stored.parent_notes().as_deref(), Some("No"));
    assert_eq!(f.ratings.rating("https://c.test").await?, SafetyRating::Flagged);
    assert!(!err.is_retryable());
    Ok(())
}

#[tokio::test]
async fn test_unknown_request_is_not_found() -> anyhow::Result<()> {
    let f = fixture().await;
    let err = f
        .workflow
        .process_decision(Uuid::new_v4(), "parent-1", true, None)
        .await
        .unwrap_err();
    assert!(matches!(approval_kind(&err), ApprovalErrorKind::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_non_parent_cannot_decide() -> anyhow::Result<()> {
    let f = fixture().await;
    let request = f.workflow.create_request(recommendation_request("https://d.test")).await?;

    let err = f
        .workflow
        .process_decision(*request.id(), "stranger", true, None)
        .await
        .unwrap_err();

    assert!(matches!(
        approval_kind(&err),
        ApprovalErrorKind::Unauthorized { parent_id, .. } if parent_id == "stranger"
    ));
    let stored = f.workflow.get(*request.id()).await?.expect("stored request");
    assert_eq!(*stored.status(), ApprovalStatus::Pending);
    assert_eq!(f.ratings.rating("https://d.test").await?, SafetyRating::Flagged);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_decisions_apply_once() -> anyhow::Result<()> {
    let f = fixture().await;
    let request = f.workflow.create_request(recommendation_request("https://e.test")).await?;
    let id = *request.id();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let workflow = f.workflow.clone();
            tokio::spawn(async move { workflow.process_decision(id, "parent-1", i % 2 == 0, None).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => successes += 1,
            Err(err) => assert!(matches!(
                approval_kind(&err),
                ApprovalErrorKind::AlreadyProcessed { .. }
            )),
        }
    }
    assert_eq!(successes, 1);
    Ok(())
}

#[tokio::test]
async fn test_filing_marks_unrated_content_flagged() -> anyhow::Result<()> {
    let f = fixture().await;
    f.ratings.set_rating("https://safe.test", SafetyRating::Safe).await?;

    f.workflow.file_request(recommendation_request("https://new.test")).await?;
    f.workflow.file_request(recommendation_request("https://safe.test")).await?;

    assert_eq!(f.ratings.rating("https://new.test").await?, SafetyRating::Flagged);
    assert_eq!(f.ratings.rating("https://safe.test").await?, SafetyRating::Safe);
    Ok(())
}

#[tokio::test]
async fn test_refiling_returns_the_existing_request() -> anyhow::Result<()> {
    let f = fixture().await;
    let first = f.workflow.file_request(recommendation_request("https://g.test")).await?;
    let second = f.workflow.file_request(recommendation_request("https://g.test")).await?;

    assert_eq!(first.id(), second.id());
    assert_eq!(f.workflow.pending_for_child("child-1").await?.len(), 1);

    f.workflow
        .process_decision(*first.id(), "parent-1", false, Some("No thanks".to_string()))
        .await?;
    let after_rejection = f.workflow.file_request(recommendation_request("https://g.test")).await?;

    assert_eq!(after_rejection.id(), first.id());
    assert_eq!(*after_rejection.status(), ApprovalStatus::Rejected);
    assert!(f.workflow.pending_for_child("child-1").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_concurrent_filing_opens_one_request() -> anyhow::Result<()> {
    let f = fixture().await;
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let workflow = f.workflow.clone();
            tokio::spawn(async move { workflow.file_request(recommendation_request("https://h.test")).await })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(*handle.await??.id());
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(f.workflow.pending_for_child("child-1").await?.len(), 1);
    Ok(())
}

struct FailingRatings;

#[async_trait]
impl ContentRatingStore for FailingRatings {
    async fn rating(&self, _content_key: &str) -> SproutResult<SafetyRating> {
        Err(CacheError::new(CacheErrorKind::Unavailable("ratings offline".to_string())).into())
    }

    async fn set_rating(&self, _content_key: &str, _rating: SafetyRating) -> SproutResult<()> {
        Err(CacheError::new(CacheErrorKind::Unavailable("ratings offline".to_string())).into())
    }
}

#[tokio::test]
async fn test_promotion_failure_does_not_undo_decision() -> anyhow::Result<()> {
    let guardians = Arc::new(InMemoryGuardianDirectory::new());
    guardians.link("parent-1", "child-1").await;
    let workflow = ApprovalWorkflow::new(
        Arc::new(InMemoryApprovalRepository::new()),
        guardians,
        Arc::new(FailingRatings),
    );
    let request = workflow.create_request(recommendation_request("https://f.test")).await?;

    let decided = workflow
        .process_decision(*request.id(), "parent-1", true, None)
        .await?;
    assert_eq!(*decided.status(), ApprovalStatus::Approved);
    Ok(())
}
