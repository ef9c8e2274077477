//! Process-local wiring of the generation pipeline.

use sprout_cache::InMemoryCacheStore;
use sprout_config::SproutConfig;
use sprout_error::SproutResult;
use sprout_generation::GenerationOrchestrator;
use sprout_interface::ModelClient;
use sprout_security::{
    ApprovalWorkflow, InMemoryApprovalRepository, InMemoryContentRatings,
    InMemoryGuardianDirectory,
};
use std::sync::Arc;

/// An orchestrator backed entirely by in-memory stores.
///
/// Handy for the CLI and for tests; services with real persistence build
/// [`GenerationOrchestrator`] themselves from their own store
/// implementations.
#[derive(Debug, Clone)]
pub struct InMemoryStack {
    orchestrator: GenerationOrchestrator,
    cache: Arc<InMemoryCacheStore>,
    approvals: Arc<InMemoryApprovalRepository>,
    guardians: Arc<InMemoryGuardianDirectory>,
    ratings: Arc<InMemoryContentRatings>,
}

impl InMemoryStack {
    /// Wire an orchestrator around `model` using `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured deny-list cannot be compiled.
    pub fn new(config: &SproutConfig, model: Arc<dyn ModelClient>) -> SproutResult<Self> {
        let cache = Arc::new(InMemoryCacheStore::from_settings(config.cache()));
        let approvals = Arc::new(InMemoryApprovalRepository::new());
        let guardians = Arc::new(InMemoryGuardianDirectory::new());
        let ratings = Arc::new(InMemoryContentRatings::new());

        let workflow = ApprovalWorkflow::new(approvals.clone(), guardians.clone(), ratings.clone());
        let orchestrator =
            GenerationOrchestrator::from_config(config, model, cache.clone(), workflow)?;

        Ok(Self {
            orchestrator,
            cache,
            approvals,
            guardians,
            ratings,
        })
    }

    /// The wired orchestrator.
    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }

    /// Response cache.
    pub fn cache(&self) -> &Arc<InMemoryCacheStore> {
        &self.cache
    }

    /// Approval requests filed so far.
    pub fn approvals(&self) -> &Arc<InMemoryApprovalRepository> {
        &self.approvals
    }

    /// Parent/child links consulted when decisions arrive.
    pub fn guardians(&self) -> &Arc<InMemoryGuardianDirectory> {
        &self.guardians
    }

    /// Content ratings promoted by approvals.
    pub fn ratings(&self) -> &Arc<InMemoryContentRatings> {
        &self.ratings
    }
}
