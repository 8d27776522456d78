//! Configuration for the Scrubber
//!
//! Loaded from TOML (or JSON, by file extension) by the CLI; library callers
//! may also build it in code.
//!
//! ```toml
//! mode = "redact"
//! model = "gpt-4o-mini"
//! mask_patterns = ["SSN:", "Credit Card:"]
//!
//! [[projection.analysis]]
//! fields = ["id", "dialog[].content"]
//! action = "keep"
//!
//! [[transform.dialog]]
//! fields_to_transform = ["content"]
//!
//! [retry]
//! max_attempts = 6
//! ```

use crate::error::ScrubError;
use hush_domain::ScrubMode;
use hush_llm::chat::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use hush_llm::RetryPolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Patterns masked when a config does not name any
pub const DEFAULT_MASK_PATTERNS: [&str; 3] = ["SSN:", "Credit Card:", "Password:"];

/// Text fields of a dialog turn that get masked by default
pub const DEFAULT_DIALOG_FIELDS: [&str; 2] = ["content", "transcript"];

/// Fields of one component entry to send through the rewriter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelection {
    /// Field names, looked up directly on each entry
    #[serde(default, alias = "fields_to_redact", alias = "fields_to_minimize")]
    pub fields_to_transform: Vec<String>,
}

/// Component-type name (`dialog`, `analysis`, `attachments`, `parties`, ...)
/// to the field selections applied to each of its entries
pub type TransformConfig = BTreeMap<String, Vec<FieldSelection>>;

/// Read a transform config from loosely typed JSON.
///
/// Components whose selections are not well-formed are skipped with a warning;
/// anything other than an object yields an empty config.
pub fn transform_config_from_value(value: &Value) -> TransformConfig {
    let Some(components) = value.as_object() else {
        return TransformConfig::new();
    };

    components
        .iter()
        .filter_map(|(component, selections)| {
            match serde_json::from_value::<Vec<FieldSelection>>(selections.clone()) {
                Ok(selections) => Some((component.clone(), selections)),
                Err(e) => {
                    warn!(component = %component, error = %e, "ignoring malformed transform config");
                    None
                }
            }
        })
        .collect()
}

/// Retry schedule for rewrite calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after the first failure (milliseconds)
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Delay growth factor
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Ceiling for a single delay (milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl RetrySettings {
    /// Convert to the provider layer's policy
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            multiplier: self.multiplier,
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            multiplier: default_multiplier(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Where the chat provider lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Chat-completions API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Environment variable holding the API key; absent or empty means no auth header
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderSettings {
    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Configuration for one scrubbing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrubConfig {
    /// Redact or minimize
    #[serde(default)]
    pub mode: ScrubMode,

    /// Model name passed through to the provider
    #[serde(default = "default_model")]
    pub model: String,

    /// Literal patterns masked in dialog text (case-insensitive)
    #[serde(default = "default_mask_patterns")]
    pub mask_patterns: Vec<String>,

    /// Dialog turn fields that get masked
    #[serde(default = "default_dialog_fields")]
    pub dialog_fields: Vec<String>,

    /// Projection rule set, e.g. `{"analysis": [{"fields": [...], "action": "keep"}]}`.
    /// Kept loosely typed: a malformed rule set disables projection instead of
    /// failing the load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<Value>,

    /// Fields to send through the rewriter, per component type
    #[serde(default)]
    pub transform: TransformConfig,

    /// Retry schedule for rewrite calls
    #[serde(default)]
    pub retry: RetrySettings,

    /// Chat provider location
    #[serde(default)]
    pub provider: ProviderSettings,
}

impl ScrubConfig {
    /// Redaction preset: default patterns, no projection, no rewrite fields
    pub fn redaction() -> Self {
        Self {
            mode: ScrubMode::Redact,
            model: default_model(),
            mask_patterns: default_mask_patterns(),
            dialog_fields: default_dialog_fields(),
            projection: None,
            transform: TransformConfig::new(),
            retry: RetrySettings::default(),
            provider: ProviderSettings::default(),
        }
    }

    /// Minimization preset: same as redaction with `[MINIMIZED]` markers
    pub fn minimization() -> Self {
        Self {
            mode: ScrubMode::Minimize,
            ..Self::redaction()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ScrubError> {
        if self.retry.max_attempts == 0 {
            return Err(ScrubError::Config(
                "retry.max_attempts must be greater than 0".to_string(),
            ));
        }
        if self.retry.multiplier.is_nan() || self.retry.multiplier < 1.0 {
            return Err(ScrubError::Config(
                "retry.multiplier must be at least 1".to_string(),
            ));
        }
        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err(ScrubError::Config(
                "retry.initial_delay_ms cannot exceed retry.max_delay_ms".to_string(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ScrubError::Config(
                "provider.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ScrubError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load configuration from JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ScrubError> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load configuration from a file; `.json` files are read as JSON, anything
    /// else as TOML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScrubError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&contents),
            _ => Self::from_toml(&contents),
        }
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ScrubError> {
        toml::to_string_pretty(self)
            .map_err(|e| ScrubError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self::redaction()
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_mask_patterns() -> Vec<String> {
    DEFAULT_MASK_PATTERNS.iter().map(|p| p.to_string()).collect()
}

fn default_dialog_fields() -> Vec<String> {
    DEFAULT_DIALOG_FIELDS.iter().map(|f| f.to_string()).collect()
}

fn default_max_attempts() -> u32 {
    hush_llm::retry::DEFAULT_MAX_ATTEMPTS
}

fn default_initial_delay_ms() -> u64 {
    hush_llm::retry::DEFAULT_INITIAL_DELAY.as_millis() as u64
}

fn default_multiplier() -> f64 {
    hush_llm::retry::DEFAULT_MULTIPLIER
}

fn default_max_delay_ms() -> u64 {
    hush_llm::retry::DEFAULT_MAX_DELAY.as_millis() as u64
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_api_key_env() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
