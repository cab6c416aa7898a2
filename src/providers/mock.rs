/*!
 * Mock provider implementations for testing.
 *
 * This module provides a scriptable provider that simulates different behaviors:
 * - `MockProvider::echo()` - Returns the request text unchanged
 * - `MockProvider::fixed()` - Always returns the same answer
 * - `MockProvider::scripted()` - Returns queued answers in call order
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::dropping_segment()` - Loses the last segment of each request
 * - `MockProvider::slow()` - Echoes after a delay (for timeout testing)
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;

use super::{CorrectionProvider, SamplingConfig};

/// Generator used by [`MockBehavior::Custom`]
pub type ResponseFn = fn(&str) -> Result<String, ProviderError>;

/// Behavior mode for the mock provider
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Returns the input unchanged
    Echo,
    /// Always returns the given text
    Fixed(String),
    /// Fails with a 500 API error
    Failing,
    /// Fails every Nth request, echoes otherwise
    Intermittent { fail_every: usize },
    /// Removes the last segment delimited by `separator`
    DropSegment { separator: String },
    /// Echoes after a delay
    Slow { delay_ms: u64 },
    /// Computes the answer from the request text
    Custom(ResponseFn),
}

/// Request seen by the mock provider
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// Text to correct
    pub text: String,
    /// Instructions sent with it
    pub instructions: String,
    /// Model requested
    pub model: String,
}

/// Mock provider for testing correction behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Answers consumed before falling back to `behavior`
    script: Arc<Mutex<VecDeque<Result<String, ProviderError>>>>,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, shared between clones
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            script: Arc::new(Mutex::new(VecDeque::new())),
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a provider that returns its input
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a provider that always answers `text`
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Fixed(text.into()))
    }

    /// Create a provider answering from a queue, echoing once it runs dry
    pub fn scripted(answers: Vec<Result<String, ProviderError>>) -> Self {
        let provider = Self::echo();
        provider.script.lock().extend(answers);
        provider
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    /// Create a provider that drops the last segment of every request
    pub fn dropping_segment(separator: impl Into<String>) -> Self {
        Self::new(MockBehavior::DropSegment {
            separator: separator.into(),
        })
    }

    /// Create a provider that echoes after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a provider computing answers with `generator`
    pub fn custom(generator: ResponseFn) -> Self {
        Self::new(MockBehavior::Custom(generator))
    }

    /// Number of `correct` calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    fn answer(&self, text: &str, count: usize) -> Result<String, ProviderError> {
        match &self.behavior {
            MockBehavior::Echo | MockBehavior::Slow { .. } => Ok(text.to_string()),
            MockBehavior::Fixed(answer) => Ok(answer.clone()),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(text.to_string())
                }
            }
            MockBehavior::DropSegment { separator } => {
                let mut segments: Vec<&str> = text.split(separator.as_str()).collect();
                segments.pop();
                Ok(segments.join(separator.as_str()))
            }
            MockBehavior::Custom(generator) => generator(text),
        }
    }
}

#[async_trait]
impl CorrectionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn correct(
        &self,
        text: &str,
        instructions: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(MockRequest {
            text: text.to_string(),
            instructions: instructions.to_string(),
            model: sampling.model.clone(),
        });

        if let MockBehavior::Slow { delay_ms } = self.behavior {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        let scripted = self.script.lock().pop_front();
        match scripted {
            Some(answer) => answer,
            None => self.answer(text, count),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            _ => Ok(()),
        }
    }
}
