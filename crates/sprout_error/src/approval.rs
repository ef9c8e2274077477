//! Approval workflow error types.

/// Reasons a parental decision cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ApprovalErrorKind {
    /// No approval request with this id
    #[display("Approval request '{}' not found", _0)]
    NotFound(String),
    /// Request already left the pending state
    #[display("Approval request '{}' was already processed ({})", request_id, status)]
    AlreadyProcessed {
        /// Request that was decided earlier
        request_id: String,
        /// Status it currently holds
        status: String,
    },
    /// Deciding parent is not the child's parent of record
    #[display("Parent '{}' is not authorized to decide for child '{}'", parent_id, child_id)]
    Unauthorized {
        /// Parent attempting the decision
        parent_id: String,
        /// Child the request belongs to
        child_id: String,
    },
    /// Backing approval store failed
    #[display("Approval store error: {}", _0)]
    Store(String),
}

/// Approval error with location tracking.
///
/// # Examples
///
/// ```
/// use sprout_error::{ApprovalError, ApprovalErrorKind};
///
/// let err = ApprovalError::new(ApprovalErrorKind::NotFound("abc".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Approval Error: {} at line {} in {}", kind, line, file)]
pub struct ApprovalError {
    /// The specific error kind
    pub kind: ApprovalErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl ApprovalError {
    /// Create a new approval error with location tracking.
    #[track_caller]
    pub fn new(kind: ApprovalErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
