//! Mock model client for testing.

use async_trait::async_trait;
use sprout_error::{GenerationError, GenerationErrorKind, SproutResult};
use sprout_interface::ModelClient;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Marker present in every safety classification prompt.
const SAFETY_PROMPT_MARKER: &str = "You review learning material";

/// A single mock response (success or error).
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(String),
    Error(GenerationErrorKind),
}

/// Behavior configuration for mock responses.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always return success with the given text
    Success(String),
    /// Always return the specified error
    Error(GenerationErrorKind),
    /// Return a sequence of responses, repeating the last one
    Sequence(Vec<MockResponse>),
    /// Sleep, then return the text
    Delayed { delay: Duration, text: String },
    /// Answer safety prompts and content prompts differently
    Routed { safety: String, content: String },
}

/// Mock model client counting its calls.
#[derive(Debug, Clone)]
pub struct MockModelClient {
    behavior: MockBehavior,
    call_count: Arc<Mutex<usize>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockModelClient {
    pub fn new_with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock client that always succeeds with the given text.
    pub fn new_success(text: impl Into<String>) -> Self {
        Self::new_with_behavior(MockBehavior::Success(text.into()))
    }

    /// Create a mock client that always fails with the given error.
    pub fn new_error(error: GenerationErrorKind) -> Self {
        Self::new_with_behavior(MockBehavior::Error(error))
    }

    /// Create a mock client with a sequence of responses.
    pub fn new_sequence(responses: Vec<MockResponse>) -> Self {
        Self::new_with_behavior(MockBehavior::Sequence(responses))
    }

    /// Get the number of times generate() was called.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Prompts received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn respond(response: &MockResponse) -> SproutResult<String> {
        match response {
            MockResponse::Success(text) => Ok(text.clone()),
            MockResponse::Error(kind) => Err(GenerationError::new(kind.clone()).into()),
        }
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn generate(&self, prompt: &str) -> SproutResult<String> {
        let current = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count - 1
        };
        self.prompts.lock().unwrap().push(prompt.to_string());

        match &self.behavior {
            MockBehavior::Success(text) => Ok(text.clone()),
            MockBehavior::Error(kind) => Err(GenerationError::new(kind.clone()).into()),
            MockBehavior::Sequence(responses) => {
                let response = responses
                    .get(current)
                    .or_else(|| responses.last())
                    .expect("sequence must not be empty");
                Self::respond(response)
            }
            MockBehavior::Delayed { delay, text } => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            MockBehavior::Routed { safety, content } => {
                if prompt.contains(SAFETY_PROMPT_MARKER) {
                    Ok(safety.clone())
                } else {
                    Ok(content.clone())
                }
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
