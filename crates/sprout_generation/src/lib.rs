//! Learning content generation for Sprout.
//!
//! The pipeline runs:
//!
//! ```text
//! GenerationOrchestrator
//!   -> GenerationCache (fresh hit returns early)
//!   -> ModelClient
//!   -> ResponseSanitizer
//!   -> SafetyClassifier + age thresholds, per item
//!   -> ApprovalWorkflow for anything not clear
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod extraction;
mod model_layer;
mod orchestrator;
pub mod prompt;
mod sanitizer;

pub use cache::GenerationCache;
pub use extraction::{extract_json, parse_json};
pub use model_layer::ModelSafetyLayer;
pub use orchestrator::{GenerationOrchestrator, RecommendationOutcome, StudyPlanOutcome};
pub use sanitizer::ResponseSanitizer;
