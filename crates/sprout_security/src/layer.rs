//! Classifier layer abstraction.

use async_trait::async_trait;
use sprout_core::SafetyVerdict;
use sprout_error::SproutResult;

/// What a layer concluded about a piece of text.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerOutcome {
    /// The layer answered; later layers are skipped.
    Verdict(SafetyVerdict),
    /// The layer has nothing decisive to say; ask the next one.
    Continue,
}

/// One strategy in the ordered safety classification.
///
/// Expected failures (an unreachable service, a malformed answer) should be
/// reported as [`LayerOutcome::Continue`]. An `Err` means the layer broke in
/// a way nobody planned for, and the classifier answers with its most
/// restrictive verdict.
#[async_trait]
pub trait SafetyLayer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Evaluate `text` for a child of `child_age`.
    async fn evaluate(&self, text: &str, child_age: u8) -> SproutResult<LayerOutcome>;
}
