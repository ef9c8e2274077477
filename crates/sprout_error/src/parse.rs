//! Model output parse errors.

/// The model returned text with no locatable or decodable JSON.
///
/// The message never embeds the raw model output; callers log a bounded
/// preview separately if they need one.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Parse Error: {} at line {} in {}", message, line, file)]
pub struct ParseError {
    /// What went wrong
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ParseError {
    /// Create a new ParseError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use sprout_error::ParseError;
    ///
    /// let err = ParseError::new("No JSON found in model response");
    /// assert!(format!("{}", err).contains("No JSON"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
