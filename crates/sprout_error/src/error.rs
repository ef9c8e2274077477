//! Top-level error wrapper types.

use crate::{
    ApprovalError, CacheError, ConfigError, GenerationError, HttpError, JsonError, ParseError,
    SafetyError,
};

/// Every error condition the pipeline can surface.
///
/// # Examples
///
/// ```
/// use sprout_error::{SproutError, ParseError};
///
/// let err: SproutError = ParseError::new("no JSON").into();
/// assert!(format!("{}", err).contains("Parse Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum SproutErrorKind {
    /// HTTP transport error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Model call failed or timed out
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Model output had no usable JSON
    #[from(ParseError)]
    Parse(ParseError),
    /// Safety classification failure
    #[from(SafetyError)]
    Safety(SafetyError),
    /// Approval state machine rejected the operation
    #[from(ApprovalError)]
    Approval(ApprovalError),
    /// Cache store failure
    #[from(CacheError)]
    Cache(CacheError),
}

/// Sprout error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Sprout Error: {}", _0)]
pub struct SproutError(Box<SproutErrorKind>);

impl SproutError {
    /// Create a new error from a kind.
    pub fn new(kind: SproutErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &SproutErrorKind {
        &self.0
    }

    /// Whether the caller may retry the same operation later.
    ///
    /// Generation failures and transient transport/cache failures are
    /// retryable. Parse, approval-state, authorization and configuration
    /// failures are not: retrying returns the same answer.
    pub fn is_retryable(&self) -> bool {
        match self.kind() {
            SproutErrorKind::Generation(e) => e.kind.is_retryable(),
            SproutErrorKind::Http(_) | SproutErrorKind::Cache(_) => true,
            SproutErrorKind::Json(_)
            | SproutErrorKind::Config(_)
            | SproutErrorKind::Parse(_)
            | SproutErrorKind::Safety(_)
            | SproutErrorKind::Approval(_) => false,
        }
    }
}

// Generic From implementation for any type that converts to SproutErrorKind
impl<T> From<T> for SproutError
where
    T: Into<SproutErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Sprout operations.
pub type SproutResult<T> = std::result::Result<T, SproutError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApprovalErrorKind, GenerationErrorKind};

    #[test]
    fn test_generation_timeout_is_retryable() {
        let err: SproutError =
            GenerationError::new(GenerationErrorKind::Timeout { seconds: 5 }).into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_client_error_status_is_not_retryable() {
        let err: SproutError = GenerationError::new(GenerationErrorKind::Http {
            status_code: 400,
            message: "bad request".to_string(),
        })
        .into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_parse_and_approval_errors_are_final() {
        let parse: SproutError = ParseError::new("no JSON").into();
        assert!(!parse.is_retryable());

        let approval: SproutError =
            ApprovalError::new(ApprovalErrorKind::NotFound("x".to_string())).into();
        assert!(!approval.is_retryable());
        assert!(matches!(approval.kind(), SproutErrorKind::Approval(_)));
    }
}
