//! End-to-end generation pipeline.

use crate::{GenerationCache, ModelSafetyLayer};
use serde::Serialize;
use sprout_config::SproutConfig;
use sha2::{Digest, Sha256};
use sprout_core::{
    ApprovalContentType, ApprovalRequest, ApprovalStatus, ContentPayload, ContentRecommendation,
    GeneratedActivity, GeneratedStudyPlan, GenerationRequest, NewApprovalRequest,
    RecommendationRequest, SafetyVerdict,
};
use sprout_error::SproutResult;
use sprout_interface::{CacheStore, ModelClient};
use sprout_security::{ApprovalWorkflow, SafetyClassifier};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Result of generating a study plan.
///
/// Flagged content is withheld: `plan` holds only the activities that
/// passed screening and `recommendations` only the recommendations that
/// did. Everything withheld is waiting on the approvals in
/// `pending_approvals`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanOutcome {
    /// Plan with flagged activities removed
    pub plan: GeneratedStudyPlan,
    /// Recommendations cleared for display
    pub recommendations: Vec<ContentRecommendation>,
    /// Whether anything was withheld pending a parent decision
    pub requires_approval: bool,
    /// Approval requests created for withheld content
    pub pending_approvals: Vec<Uuid>,
}

/// Result of generating standalone recommendations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationOutcome {
    /// Recommendations cleared for display
    pub recommendations: Vec<ContentRecommendation>,
    /// Whether anything was withheld pending a parent decision
    pub requires_approval: bool,
    /// Approval requests created for withheld content
    pub pending_approvals: Vec<Uuid>,
}

/// Coordinates generation, screening and escalation.
///
/// Every generated activity and recommendation is screened for the
/// requesting child. Content that is not clear is withheld and filed for
/// parental approval; the rest is returned. Generation failures propagate
/// unchanged and no partial plan is ever fabricated.
///
/// Filing is keyed by child and content, so repeating a request reuses the
/// approval already on file: pending content stays withheld under the same
/// request, approved content is released and rejected content stays
/// withheld without asking again.
#[derive(Debug, Clone)]
pub struct GenerationOrchestrator {
    cache: GenerationCache,
    classifier: SafetyClassifier,
    approvals: ApprovalWorkflow,
}

impl GenerationOrchestrator {
    /// Assemble an orchestrator from its parts.
    pub fn new(cache: GenerationCache, classifier: SafetyClassifier, approvals: ApprovalWorkflow) -> Self {
        Self {
            cache,
            classifier,
            approvals,
        }
    }

    /// Build the cache and classifier from configuration.
    ///
    /// The model-based safety layer is added when `safety.model_classifier`
    /// is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured deny-list cannot be compiled.
    pub fn from_config(
        config: &SproutConfig,
        model: Arc<dyn ModelClient>,
        store: Arc<dyn CacheStore>,
        approvals: ApprovalWorkflow,
    ) -> SproutResult<Self> {
        let mut classifier = SafetyClassifier::from_settings(config.safety())?;
        if *config.safety().model_classifier() {
            classifier = classifier.with_layer(ModelSafetyLayer::new(
                Arc::clone(&model),
                config.generation().timeout(),
            ));
        }
        let cache = GenerationCache::new(store, model, config.cache(), config.generation());
        debug!(layers = ?classifier.layer_names(), "Orchestrator configured");
        Ok(Self::new(cache, classifier, approvals))
    }

    /// Safety classifier in use.
    pub fn classifier(&self) -> &SafetyClassifier {
        &self.classifier
    }

    /// Approval workflow in use.
    pub fn approvals(&self) -> &ApprovalWorkflow {
        &self.approvals
    }

    /// Generate, screen and gate a study plan.
    ///
    /// Each flagged recommendation gets its own approval request. If any
    /// activity is flagged, the whole plan as generated is filed as one
    /// study-plan approval request, keyed by a digest of that plan. A
    /// flagged plan title or description withholds every activity.
    ///
    /// # Errors
    ///
    /// Propagates generation and parse failures, and failures to record an
    /// approval request.
    #[instrument(skip(self, request), fields(child_id = %request.child_id, subject = %request.subject))]
    pub async fn generate_study_plan(&self, request: &GenerationRequest) -> SproutResult<StudyPlanOutcome> {
        let plan = self.cache.get_or_generate(request).await?;
        let child_age = request.child_age;

        let header = format!("{}\n{}", plan.title(), plan.description());
        let header_verdict = self.classifier.check(&header, child_age).await;
        let header_flagged = !header_verdict.is_clear();

        let mut flagged: Vec<(&GeneratedActivity, SafetyVerdict)> = Vec::new();
        for activity in plan.activities() {
            let verdict = self.classifier.check_activity(activity, child_age).await;
            if !verdict.is_clear() {
                debug!(activity_id = %activity.id, concerns = ?verdict.flagged_concerns(), "Activity flagged");
                flagged.push((activity, verdict));
            }
        }

        let mut pending_approvals = Vec::new();
        let mut withhold_flagged = false;
        if header_flagged || !flagged.is_empty() {
            let header_verdicts = header_flagged.then_some(&header_verdict);
            let verdict = combine(header_verdicts.into_iter().chain(flagged.iter().map(|(_, v)| v)));
            let payload = ContentPayload::snapshot(&plan)?;
            let content_key = format!("study-plan:{:x}", Sha256::digest(payload.as_bytes()));
            let filed = self
                .approvals
                .file_request(NewApprovalRequest {
                    child_id: request.child_id.clone(),
                    subject_plan_id: request.subject_plan_id.clone(),
                    content_type: ApprovalContentType::StudyPlan,
                    content_payload: payload,
                    content_key: Some(content_key),
                    safety_verdict: verdict,
                })
                .await?;
            withhold_flagged = *filed.status() != ApprovalStatus::Approved;
            if *filed.status() == ApprovalStatus::Pending {
                pending_approvals.push(*filed.id());
            }
        }

        let (recommendations, recommendation_approvals) = self
            .screen_recommendations(
                plan.recommendations(),
                &request.child_id,
                request.subject_plan_id.as_deref(),
                child_age,
            )
            .await?;
        pending_approvals.extend(recommendation_approvals);

        let flagged_activities: Vec<&GeneratedActivity> = flagged.iter().map(|(a, _)| *a).collect();
        let visible = plan.retain_activities(|a| {
            !withhold_flagged || (!header_flagged && !flagged_activities.contains(&a))
        });

        info!(
            activities = visible.activities().len(),
            withheld_activities = plan.activities().len() - visible.activities().len(),
            recommendations = recommendations.len(),
            pending_approvals = pending_approvals.len(),
            "Study plan generated"
        );

        Ok(StudyPlanOutcome {
            plan: visible,
            recommendations,
            requires_approval: !pending_approvals.is_empty(),
            pending_approvals,
        })
    }

    /// Generate, screen and gate standalone recommendations.
    ///
    /// # Errors
    ///
    /// Same as [`GenerationOrchestrator::generate_study_plan`].
    #[instrument(skip(self, request), fields(child_id = %request.child_id, subject = %request.subject))]
    pub async fn generate_content_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> SproutResult<RecommendationOutcome> {
        let generated = self.cache.get_or_generate_recommendations(request).await?;
        let (recommendations, pending_approvals) = self
            .screen_recommendations(
                &generated,
                &request.child_id,
                request.subject_plan_id.as_deref(),
                request.child_age,
            )
            .await?;

        info!(
            recommendations = recommendations.len(),
            pending_approvals = pending_approvals.len(),
            "Recommendations generated"
        );

        Ok(RecommendationOutcome {
            recommendations,
            requires_approval: !pending_approvals.is_empty(),
            pending_approvals,
        })
    }

    /// Screen one recommendation for a child.
    pub async fn validate_content_safety(
        &self,
        content: &ContentRecommendation,
        child_age: u8,
    ) -> SafetyVerdict {
        self.classifier.validate_content_safety(content, child_age).await
    }

    /// File an approval request directly.
    pub async fn create_approval_request(&self, request: NewApprovalRequest) -> SproutResult<ApprovalRequest> {
        self.approvals.create_request(request).await
    }

    /// Apply a parent's decision. See [`ApprovalWorkflow::process_decision`].
    pub async fn process_approval_decision(
        &self,
        request_id: Uuid,
        parent_id: &str,
        approved: bool,
        notes: Option<String>,
    ) -> SproutResult<ApprovalRequest> {
        self.approvals
            .process_decision(request_id, parent_id, approved, notes)
            .await
    }

    /// Split recommendations into cleared ones and approval requests for the
    /// rest.
    async fn screen_recommendations(
        &self,
        candidates: &[ContentRecommendation],
        child_id: &str,
        subject_plan_id: Option<&str>,
        child_age: u8,
    ) -> SproutResult<(Vec<ContentRecommendation>, Vec<Uuid>)> {
        let mut cleared = Vec::new();
        let mut pending = Vec::new();

        for content in candidates {
            let verdict = self.classifier.validate_content_safety(content, child_age).await;
            if verdict.is_clear() {
                cleared.push(content.clone());
                continue;
            }

            debug!(title = %content.title, concerns = ?verdict.flagged_concerns(), "Recommendation flagged");
            let filed = self
                .approvals
                .file_request(NewApprovalRequest {
                    child_id: child_id.to_string(),
                    subject_plan_id: subject_plan_id.map(str::to_string),
                    content_type: ApprovalContentType::ContentRecommendation,
                    content_payload: ContentPayload::snapshot(content)?,
                    content_key: Some(content.content_key().to_string()),
                    safety_verdict: verdict,
                })
                .await?;
            match filed.status() {
                ApprovalStatus::Pending => pending.push(*filed.id()),
                ApprovalStatus::Approved => cleared.push(content.clone()),
                ApprovalStatus::Rejected => {
                    debug!(title = %content.title, "Recommendation rejected earlier, withholding")
                }
            }
        }

        Ok((cleared, pending))
    }
}

/// One verdict summarizing several flagged ones: flags and scores take the
/// worst value, concerns and reasons are merged without duplicates.
fn combine<'a>(verdicts: impl IntoIterator<Item = &'a SafetyVerdict>) -> SafetyVerdict {
    let verdicts: Vec<&SafetyVerdict> = verdicts.into_iter().collect();
    let Some(first) = verdicts.first() else {
        return SafetyVerdict::default_safe();
    };

    let mut concerns: Vec<String> = Vec::new();
    let mut reasons: Vec<String> = Vec::new();
    for verdict in &verdicts {
        for concern in verdict.flagged_concerns() {
            if !concerns.contains(concern) {
                concerns.push(concern.clone());
            }
        }
        for reason in verdict.reasons() {
            if !reasons.contains(reason) {
                reasons.push(reason.clone());
            }
        }
    }

    let combined = SafetyVerdict::new(
        verdicts.iter().all(|v| *v.is_appropriate()),
        verdicts.iter().all(|v| *v.age_appropriate()),
        verdicts.iter().map(|v| *v.safety_score()).fold(1.0, f64::min),
        verdicts.iter().map(|v| *v.educational_value()).fold(1.0, f64::min),
        *first.source(),
    )
    .with_concerns(concerns)
    .requiring_approval();

    reasons
        .into_iter()
        .fold(combined, |verdict, reason| verdict.with_reason(reason))
}
