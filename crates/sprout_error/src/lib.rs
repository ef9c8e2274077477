//! Error types for the Sprout pipeline.
//!
//! Every error follows the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - constructors use `#[track_caller]` for automatic location capture
//!
//! All of them roll up into [`SproutError`], which callers can ask whether a
//! failure is worth retrying.
//!
//! # Examples
//!
//! ```
//! use sprout_error::{GenerationError, GenerationErrorKind, SproutResult};
//!
//! fn call_model() -> SproutResult<String> {
//!     Err(GenerationError::new(GenerationErrorKind::Timeout { seconds: 30 }))?
//! }
//!
//! let err = call_model().unwrap_err();
//! assert!(err.is_retryable());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod approval;
mod cache;
mod config;
mod error;
mod generation;
mod http;
mod json;
mod parse;
mod safety;

pub use approval::{ApprovalError, ApprovalErrorKind};
pub use cache::{CacheError, CacheErrorKind};
pub use config::ConfigError;
pub use error::{SproutError, SproutErrorKind, SproutResult};
pub use generation::{GenerationError, GenerationErrorKind};
pub use http::HttpError;
pub use json::JsonError;
pub use parse::ParseError;
pub use safety::{SafetyError, SafetyErrorKind};
