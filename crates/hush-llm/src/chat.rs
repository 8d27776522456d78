//! Chat-completions provider
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. Each call sends
//! a fixed system message for the scrub mode and the prompt as the user
//! message, and returns the first choice's content.
//!
//! A call is a single attempt. Wrap the provider in
//! [`RetryingProvider`](crate::RetryingProvider) for backoff.
//!
//! # Examples
//!
//! ```no_run
//! use hush_llm::ChatProvider;
//! use hush_domain::{Rewriter, ScrubMode};
//!
//! let provider = ChatProvider::new("https://api.openai.com/v1", "gpt-4o-mini")
//!     .unwrap()
//!     .with_api_key(std::env::var("OPENAI_API_KEY").unwrap())
//!     .for_mode(ScrubMode::Redact);
//!
//! let reply = provider.rewrite("Redact: my card is 4111-1111-1111-1111").unwrap();
//! ```

use crate::LlmError;
use hush_domain::{Rewriter, ScrubMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::runtime::Runtime;

/// Default chat-completions API base
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default timeout for a single request (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// System message used for a scrub mode
pub fn system_prompt_for(mode: ScrubMode) -> &'static str {
    match mode {
        ScrubMode::Redact => "You are a redaction assistant.",
        ScrubMode::Minimize => "You are a data minimization assistant.",
    }
}

/// OpenAI-compatible chat provider
///
/// The HTTP client is async; a private current-thread runtime drives it so the
/// provider can sit behind the synchronous `Rewriter` trait. Do not call it
/// from inside another tokio runtime.
pub struct ChatProvider {
    endpoint: String,
    model: String,
    system_prompt: String,
    api_key: Option<String>,
    client: reqwest::Client,
    runtime: Runtime,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatProvider {
    /// Create a provider with the default request timeout
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Other` if the HTTP client or runtime cannot be built.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with an explicit request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            system_prompt: system_prompt_for(ScrubMode::default()).to_string(),
            api_key: None,
            client,
            runtime,
        })
    }

    /// Send `Authorization: Bearer <key>` with every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Replace the system message
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Use the system message for `mode`
    pub fn for_mode(self, mode: ScrubMode) -> Self {
        self.with_system_prompt(system_prompt_for(mode))
    }

    /// Model name sent with each request
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    /// Run one chat completion
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The endpoint cannot be reached
    /// - The model is unknown (HTTP 404)
    /// - The API is rate limiting (HTTP 429)
    /// - The response has no choices or cannot be parsed
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let mut request = self.client.post(self.url()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| LlmError::InvalidResponse("Response contained no choices".to_string()))
    }
}

impl Rewriter for ChatProvider {
    type Error = LlmError;

    fn rewrite(&self, prompt: &str) -> Result<String, Self::Error> {
        self.runtime.block_on(self.complete(prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_provider_creation() {
        let provider = ChatProvider::new(DEFAULT_ENDPOINT, "gpt-4o-mini").unwrap();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model(), "gpt-4o-mini");
        assert!(provider.api_key.is_none());
        assert_eq!(provider.system_prompt, "You are a redaction assistant.");
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let provider = ChatProvider::new("http://localhost:8000/v1/", "m").unwrap();
        assert_eq!(provider.url(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_for_mode_sets_system_prompt() {
        let provider = ChatProvider::new(DEFAULT_ENDPOINT, "m")
            .unwrap()
            .for_mode(ScrubMode::Minimize);
        assert_eq!(provider.system_prompt, "You are a data minimization assistant.");
    }

    #[test]
    fn test_request_shape() {
        let body = ChatRequest {
            model: "m",
            messages: [
                ChatMessage { role: "system", content: "sys" },
                ChatMessage { role: "user", content: "hi" },
            ],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["messages"][0]["role"], "system");
    }

    #[test]
    fn test_response_parsing() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "done"}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("done"));
    }

    #[test]
    fn test_chat_error_handling() {
        // Nothing listens on port 1
        let provider = ChatProvider::with_timeout("http://127.0.0.1:1", "m", Duration::from_secs(2))
            .unwrap();

        match provider.rewrite("test") {
            Err(LlmError::Communication(_)) => {} // Expected
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }
}
