//! Generation (model call) error types.

/// Ways a call to the generative backend can fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GenerationErrorKind {
    /// Model client is missing credentials or could not be built
    #[display("Model client misconfigured: {}", _0)]
    ClientConfiguration(String),
    /// Request to the model failed before a response arrived
    #[display("Model call failed: {}", _0)]
    ModelCall(String),
    /// Backend answered with a non-success status
    #[display("HTTP {} error: {}", status_code, message)]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Error body or reason
        message: String,
    },
    /// Model call exceeded the caller-supplied deadline
    #[display("Model call timed out after {}s", seconds)]
    Timeout {
        /// Deadline that elapsed
        seconds: u64,
    },
    /// Backend answered but produced no text
    #[display("Model returned an empty response")]
    EmptyResponse,
}

impl GenerationErrorKind {
    /// Whether retrying the same request later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationErrorKind::Http { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            GenerationErrorKind::ModelCall(_)
            | GenerationErrorKind::Timeout { .. }
            | GenerationErrorKind::EmptyResponse => true,
            GenerationErrorKind::ClientConfiguration(_) => false,
        }
    }
}

/// Generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use sprout_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::Http {
///     status_code: 503,
///     message: "overloaded".to_string(),
/// });
/// assert!(err.kind.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The specific error kind
    pub kind: GenerationErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new generation error with location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
