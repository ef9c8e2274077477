//! Trait definitions for the Sprout pipeline.
//!
//! Every external collaborator of the generation pipeline is reached through
//! one of these traits, so services are assembled by passing implementations
//! into constructors rather than through process-wide singletons.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{
    ApprovalRepository, CacheStore, ContentRatingStore, GuardianDirectory, ModelClient,
};
