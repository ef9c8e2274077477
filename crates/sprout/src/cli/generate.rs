//! Generation commands: `plan` and `recommend`.

use super::{print_json, read_json};
use sprout::{
    GeminiClient, GenerationRequest, InMemoryStack, RecommendationRequest, SproutConfig,
    SproutResult,
};
use std::path::Path;
use std::sync::Arc;

fn stack(config: &SproutConfig) -> SproutResult<InMemoryStack> {
    let model = Arc::new(GeminiClient::new(config.generation())?);
    InMemoryStack::new(config, model)
}

/// Generate, screen and print a study plan.
pub async fn generate_plan(config: &SproutConfig, request_path: &Path) -> SproutResult<()> {
    let request: GenerationRequest = read_json(request_path)?;
    let outcome = stack(config)?
        .orchestrator()
        .generate_study_plan(&request)
        .await?;
    if outcome.requires_approval {
        tracing::info!(
            pending = outcome.pending_approvals.len(),
            "Some content is waiting on a parent"
        );
    }
    print_json(&outcome)
}

/// Generate, screen and print content recommendations.
pub async fn generate_recommendations(
    config: &SproutConfig,
    request_path: &Path,
) -> SproutResult<()> {
    let request: RecommendationRequest = read_json(request_path)?;
    let outcome = stack(config)?
        .orchestrator()
        .generate_content_recommendations(&request)
        .await?;
    print_json(&outcome)
}
