//! Error types for the Scrubber
//!
//! Only configuration loading and provider construction can fail. Running a
//! document through the scrubber never returns an error: rewrite failures are
//! absorbed per field and reported in the run's `WalkReport`.

use hush_llm::LlmError;
use thiserror::Error;

/// Errors that can occur while setting up a scrubber
#[derive(Error, Debug)]
pub enum ScrubError {
    /// Configuration values are out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML for this schema
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration file is not valid JSON for this schema
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// The provider's API key variable is not set
    #[error("API key environment variable '{0}' is not set")]
    MissingApiKey(String),

    /// Provider could not be constructed
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

impl From<serde_json::Error> for ScrubError {
    fn from(e: serde_json::Error) -> Self {
        ScrubError::JsonParse(e.to_string())
    }
}
