//! Safety classification error types.

/// Safety classification failure conditions.
///
/// External service failures are normally absorbed by the classifier and
/// never reach callers; these kinds exist so layers can report them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SafetyErrorKind {
    /// Classifier was configured with invalid settings
    #[display("Safety configuration error: {}", _0)]
    Configuration(String),
    /// External safety service call failed
    #[display("External safety service failed: {}", _0)]
    ExternalService(String),
    /// Classifier hit an unexpected internal condition
    #[display("Classifier failure: {}", _0)]
    Classifier(String),
}

/// Safety error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Safety Error: {} at line {} in {}", kind, line, file)]
pub struct SafetyError {
    /// The specific error kind
    pub kind: SafetyErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl SafetyError {
    /// Create a new safety error with location tracking.
    #[track_caller]
    pub fn new(kind: SafetyErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
