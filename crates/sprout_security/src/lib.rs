//! Safety framework for AI-generated children's learning content.
//!
//! Content passes through two independent checks before a child may see it:
//!
//! 1. **Textual classification** - an ordered list of [`SafetyLayer`]s
//!    (keyword deny-list, optional external safety service, optional
//!    model-based classifier) evaluated until one answers, with a
//!    conservative default when none does
//! 2. **Age thresholds** - difficulty, duration and safety-score limits for
//!    the child's [`AgeBand`](sprout_core::AgeBand)
//!
//! Content failing either check is escalated through the
//! [`ApprovalWorkflow`], which records a pending request and applies the
//! parent's decision exactly once.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod age;
mod approval;
mod classifier;
mod external;
mod keyword;
mod layer;
mod memory;

pub use age::{AgeCheck, AgeThresholdPolicy};
pub use approval::ApprovalWorkflow;
pub use classifier::SafetyClassifier;
pub use external::ExternalSafetyLayer;
pub use keyword::{DEFAULT_DENY_LIST, KeywordLayer};
pub use layer::{LayerOutcome, SafetyLayer};
pub use memory::{InMemoryApprovalRepository, InMemoryContentRatings, InMemoryGuardianDirectory};
