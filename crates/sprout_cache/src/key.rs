//! Deterministic cache keys for generation requests.

use serde::Serialize;
use sha2::{Digest, Sha256};
use sprout_core::{ContentType, GenerationRequest, LearningStyle, RecommendationRequest};

/// Namespaced digest of the generation-relevant fields of a request.
///
/// Only fields that change what the model is asked for take part. Timestamps
/// and child identity are left out, and list fields are sorted, so requests
/// that differ only in ordering share a key.
///
/// `prior_performance` and `content_preferences` are left out too, even though
/// the prompt includes them. Two children with the same subject, age and
/// objectives share one cached plan, and whichever request fills the entry
/// decides how those hints shaped it until the entry expires. A plan tailored
/// to one child's history can therefore be served to another. Callers that need
/// per-child tailoring should disable the cache or shorten its TTL.
///
/// # Examples
///
/// ```
/// use sprout_cache::CacheKey;
/// use sprout_core::GenerationRequest;
///
/// let a = GenerationRequest::builder()
///     .child_id("a")
///     .subject("Mathematics")
///     .child_age(6u8)
///     .objectives(vec!["add".to_string(), "count".to_string()])
///     .build()
///     .unwrap();
/// let mut b = a.clone();
/// b.child_id = "b".to_string();
/// b.objectives.reverse();
///
/// assert_eq!(CacheKey::for_study_plan(&a), CacheKey::for_study_plan(&b));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: &'static str,
    digest: String,
}

#[derive(Serialize)]
struct StudyPlanProjection<'a> {
    age: u8,
    grade: Option<&'a str>,
    subject: &'a str,
    topic: Option<&'a str>,
    learning_style: LearningStyle,
    duration: u32,
    objectives: Vec<&'a str>,
}

#[derive(Serialize)]
struct RecommendationProjection<'a> {
    age: u8,
    subject: &'a str,
    topic: &'a str,
    content_types: Vec<ContentType>,
}

impl CacheKey {
    /// Key for a study-plan request.
    pub fn for_study_plan(request: &GenerationRequest) -> Self {
        let mut objectives: Vec<&str> = request
            .objectives
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .collect();
        objectives.sort_unstable();

        let projection = StudyPlanProjection {
            age: request.child_age,
            grade: request.grade_level.as_deref().map(str::trim),
            subject: request.subject.trim(),
            topic: request.topic.as_deref().map(str::trim),
            learning_style: request.learning_style.non_negative(),
            duration: request.duration_minutes,
            objectives,
        };
        Self::from_projection("study-plan", &projection)
    }

    /// Key for a content-recommendation request.
    pub fn for_recommendations(request: &RecommendationRequest) -> Self {
        let mut content_types = request.content_types.clone();
        content_types.sort_unstable_by_key(|t| t.to_string());
        content_types.dedup();

        let projection = RecommendationProjection {
            age: request.child_age,
            subject: request.subject.trim(),
            topic: request.topic.trim(),
            content_types,
        };
        Self::from_projection("recommendations", &projection)
    }

    fn from_projection<P: Serialize>(namespace: &'static str, projection: &P) -> Self {
        // Projections hold only strings, integers and finite floats.
        let canonical = serde_json::to_vec(projection).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(namespace.as_bytes());
        hasher.update(b"\0");
        hasher.update(&canonical);
        Self {
            namespace,
            digest: format!("{:x}", hasher.finalize()),
        }
    }

    /// Hex digest of the canonical projection.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Namespace the key belongs to.
    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Store key: `<namespace>:<digest>`.
    pub fn as_store_key(&self) -> String {
        format!("{}:{}", self.namespace, self.digest)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn request() -> GenerationRequest {
        GenerationRequest::builder()
            .child_id("child-1")
            .subject("Mathematics")
            .grade_level(Some("1st grade".to_string()))
            .child_age(6u8)
            .duration_minutes(60u32)
            .learning_style(LearningStyle::new(0.4, 0.2, 0.3, 0.1))
            .objectives(vec![
                "count to 20".to_string(),
                "add single digits".to_string(),
                "recognise shapes".to_string(),
            ])
            .build()
            .unwrap()
    }

    #[test]
    fn test_objective_order_does_not_matter() {
        let a = request();
        let mut b = request();
        b.objectives.rotate_left(1);
        assert_eq!(CacheKey::for_study_plan(&a), CacheKey::for_study_plan(&b));
    }

    #[test]
    fn test_personal_hints_share_a_key() {
        let a = request();
        let mut b = request();
        b.requested_at = Utc::now() - Duration::days(3);
        b.child_id = "child-2".to_string();
        b.prior_performance = Some("struggled with subtraction".to_string());
        b.content_preferences = vec!["video".to_string()];
        assert_eq!(CacheKey::for_study_plan(&a), CacheKey::for_study_plan(&b));
    }

    #[test]
    fn test_semantic_fields_change_key() {
        let base = CacheKey::for_study_plan(&request());

        let mut older = request();
        older.child_age = 7;
        assert_ne!(base, CacheKey::for_study_plan(&older));

        let mut longer = request();
        longer.duration_minutes = 90;
        assert_ne!(base, CacheKey::for_study_plan(&longer));

        let mut style = request();
        style.learning_style.visual = 0.9;
        assert_ne!(base, CacheKey::for_study_plan(&style));

        let mut subject = request();
        subject.subject = "Science".to_string();
        assert_ne!(base, CacheKey::for_study_plan(&subject));
    }

    #[test]
    fn test_negative_weights_canonicalise_to_zero() {
        let mut a = request();
        a.learning_style.auditory = 0.0;
        let mut b = request();
        b.learning_style.auditory = -0.5;
        assert_eq!(CacheKey::for_study_plan(&a), CacheKey::for_study_plan(&b));
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let rec = RecommendationRequest::builder()
            .child_id("child-1")
            .subject("Mathematics")
            .topic("counting")
            .child_age(6u8)
            .content_types(vec![ContentType::Video, ContentType::Article])
            .build()
            .unwrap();
        let mut reordered = rec.clone();
        reordered.content_types.reverse();

        let key = CacheKey::for_recommendations(&rec);
        assert_eq!(key, CacheKey::for_recommendations(&reordered));
        assert!(key.as_store_key().starts_with("recommendations:"));
        assert_eq!(key.digest().len(), 64);
    }
}
