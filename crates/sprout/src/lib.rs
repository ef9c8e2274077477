//! Sprout - safe learning-content generation
//!
//! Sprout turns a child's learning request into a study plan or a set of
//! content recommendations using a generative model, then makes sure nothing
//! reaches the child without passing safety screening for their age.
//!
//! # Features
//!
//! - **Response cache**: equivalent requests are answered from a TTL cache
//!   instead of calling the model again
//! - **Sanitization**: model output is extracted from prose, defaulted and
//!   clamped into typed records
//! - **Layered safety**: keyword deny-list, optional external service and
//!   optional model classifier, plus age-band limits
//! - **Parental approval**: flagged content is withheld and filed for a
//!   parent's decision
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sprout::{GeminiClient, GenerationRequest, InMemoryStack, SproutConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SproutConfig::load()?;
//!     let model = Arc::new(GeminiClient::new(config.generation())?);
//!     let stack = InMemoryStack::new(&config, model)?;
//!
//!     let request = GenerationRequest::builder()
//!         .child_id("child-1")
//!         .subject("Mathematics")
//!         .child_age(6u8)
//!         .build()?;
//!
//!     let outcome = stack.orchestrator().generate_study_plan(&request).await?;
//!     println!("{}", serde_json::to_string_pretty(&outcome)?);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `sprout_error` - Error types
//! - `sprout_core` - Requests, generated records, verdicts, approvals
//! - `sprout_interface` - Model, cache and repository traits
//! - `sprout_config` - Layered configuration
//! - `sprout_cache` - Cache keys, entries and the in-memory store
//! - `sprout_models` - Gemini model client
//! - `sprout_security` - Safety classifier and approval workflow
//! - `sprout_generation` - Sanitizer, generation cache and orchestrator
//!
//! This crate (`sprout`) re-exports everything for convenience.

pub use sprout_cache::*;
pub use sprout_config::*;
pub use sprout_core::*;
pub use sprout_error::*;
pub use sprout_generation::{
    GenerationCache, GenerationOrchestrator, ModelSafetyLayer, RecommendationOutcome,
    ResponseSanitizer, StudyPlanOutcome, extract_json, parse_json,
};
pub use sprout_interface::*;
pub use sprout_models::*;
pub use sprout_security::*;

pub mod observability;
mod stack;

pub use stack::InMemoryStack;
