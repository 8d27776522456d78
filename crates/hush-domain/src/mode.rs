//! Scrub mode - what kind of scrubbing a run performs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker left behind by redaction
pub const REDACTED_MARKER: &str = "[REDACTED]";

/// Marker left behind by minimization
pub const MINIMIZED_MARKER: &str = "[MINIMIZED]";

/// Scrubbing mode
///
/// - Redact: sensitive spans are replaced by a marker
/// - Minimize: non-essential content is shortened or removed entirely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrubMode {
    /// Replace sensitive content with `[REDACTED]`
    #[default]
    Redact,

    /// Reduce content to what is essential, dropping it when nothing is
    Minimize,
}

impl ScrubMode {
    /// Get the mode name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrubMode::Redact => "redact",
            ScrubMode::Minimize => "minimize",
        }
    }

    /// Parse a mode from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "redact" => Some(ScrubMode::Redact),
            "minimize" => Some(ScrubMode::Minimize),
            _ => None,
        }
    }

    /// Marker text written in place of masked content
    pub fn marker(&self) -> &'static str {
        match self {
            ScrubMode::Redact => REDACTED_MARKER,
            ScrubMode::Minimize => MINIMIZED_MARKER,
        }
    }

    /// Prefix used for the per-run processing time and failure log lines
    pub fn metric_prefix(&self) -> &'static str {
        match self {
            ScrubMode::Redact => "conserver.link.redact",
            ScrubMode::Minimize => "conserver.link.minimize",
        }
    }

    /// Deterministic replacement for a field whose rewrite failed.
    ///
    /// Minimization drops the value. Redaction keeps strings as a marker and
    /// drops anything else.
    pub fn fallback(&self, original: &Value) -> Value {
        match (self, original) {
            (ScrubMode::Redact, Value::String(_)) => Value::String(REDACTED_MARKER.to_string()),
            _ => Value::Null,
        }
    }
}

impl std::str::FromStr for ScrubMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid scrub mode: {}", s))
    }
}
