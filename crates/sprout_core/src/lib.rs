//! Core data types for the Sprout learning-content pipeline.
//!
//! These types are shared by every other crate: generation requests, the
//! bounded records produced from model output, safety verdicts, age bands
//! and approval requests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod activity;
mod age;
mod approval;
mod plan;
mod recommendation;
mod request;
mod verdict;

pub use activity::{
    ACTIVITY_DURATION_RANGE, ActivityType, DIFFICULTY_RANGE, GeneratedActivity,
    GeneratedActivityBuilder,
};
pub use age::{AgeBand, AgeThreshold};
pub use approval::{
    ApprovalContentType, ApprovalRequest, ApprovalStatus, ContentPayload, NewApprovalRequest,
};
pub use plan::GeneratedStudyPlan;
pub use recommendation::{
    ContentRecommendation, ContentRecommendationBuilder, ContentType,
    RECOMMENDATION_DURATION_RANGE,
};
pub use request::{
    GenerationRequest, GenerationRequestBuilder, LearningStyle, RecommendationRequest,
    RecommendationRequestBuilder,
};
pub use verdict::{SafetyRating, SafetyVerdict, VerdictSource};
