//! Hush LLM Provider Layer
//!
//! Implementations of the `Rewriter` trait from `hush-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `ChatProvider`: OpenAI-compatible chat-completions API
//! - `RetryingProvider`: Wraps any provider with bounded exponential backoff
//!
//! # Examples
//!
//! ```
//! use hush_llm::{MockProvider, RetryPolicy, RetryingProvider};
//! use hush_domain::Rewriter;
//!
//! let provider = RetryingProvider::new(MockProvider::new("Hello from LLM!"), RetryPolicy::no_delay(3));
//! let result = provider.rewrite("test prompt").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod chat;
pub mod retry;

use hush_domain::Rewriter;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub use chat::ChatProvider;
pub use retry::{retry_with_backoff, RetryError, RetryPolicy, RetryingProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Every attempt allowed by the retry policy failed
    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Attempts made
        attempts: u32,
        /// Error from the final attempt
        last_error: String,
    },

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Error,
}

impl Reply {
    fn to_result(&self) -> Result<String, LlmError> {
        match self {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Error => Err(LlmError::Other("Mock error".to_string())),
        }
    }
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured replies without making any network calls. Specific
/// replies are keyed by a substring of the prompt, so a test can target the
/// field text embedded in a larger prompt template.
///
/// # Examples
///
/// ```
/// use hush_llm::MockProvider;
/// use hush_domain::Rewriter;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.rewrite("any prompt").unwrap(), "Fixed response");
///
/// // Replies keyed by prompt content
/// let mut provider = MockProvider::default();
/// provider.add_response("alpha", "response1");
/// provider.add_error("beta");
/// assert_eq!(provider.rewrite("...alpha...").unwrap(), "response1");
/// assert!(provider.rewrite("...beta...").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_reply: Reply,
    replies: Arc<Mutex<Vec<(String, Reply)>>>,
    failures_remaining: Arc<AtomicUsize>,
    call_count: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_default(Reply::Text(response.into()))
    }

    /// Create a MockProvider that fails every call
    pub fn failing() -> Self {
        Self::with_default(Reply::Error)
    }

    fn with_default(default_reply: Reply) -> Self {
        Self {
            default_reply,
            replies: Arc::new(Mutex::new(Vec::new())),
            failures_remaining: Arc::new(AtomicUsize::new(0)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail the next `count` calls before answering normally
    pub fn fail_first(self, count: usize) -> Self {
        self.failures_remaining.store(count, Ordering::SeqCst);
        self
    }

    /// Reply with `response` whenever the prompt contains `needle`
    ///
    /// Earlier registrations win when several needles match.
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.lock_replies()
            .push((needle.into(), Reply::Text(response.into())));
    }

    /// Configure to return an error whenever the prompt contains `needle`
    pub fn add_error(&mut self, needle: impl Into<String>) {
        self.lock_replies().push((needle.into(), Reply::Error));
    }

    /// Get the number of times rewrite was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, Vec<(String, Reply)>> {
        self.replies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl Rewriter for MockProvider {
    type Error = LlmError;

    fn rewrite(&self, prompt: &str) -> Result<String, Self::Error> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let transient = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if transient {
            return Err(LlmError::Communication("Mock transient failure".to_string()));
        }

        let replies = self.lock_replies();
        match replies.iter().find(|(needle, _)| prompt.contains(needle.as_str())) {
            Some((_, reply)) => reply.to_result(),
            None => self.default_reply.to_result(),
        }
    }
}
