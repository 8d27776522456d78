//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use hush_scrubber::WalkReport;
use serde_json::Value;

/// Output formatter.
pub struct Formatter {
    compact: bool,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(compact: bool, color_enabled: bool) -> Self {
        Self {
            compact,
            color_enabled,
        }
    }

    /// Format a document as JSON.
    pub fn document(&self, document: &Value) -> Result<String> {
        if self.compact {
            Ok(serde_json::to_string(document)?)
        } else {
            Ok(serde_json::to_string_pretty(document)?)
        }
    }

    /// Format a run report.
    pub fn summary(&self, report: &WalkReport) -> String {
        let headline = if report.failure_count() == 0 {
            self.success("Scrubbed without rewrite failures")
        } else {
            self.warning(&format!(
                "{} field(s) fell back after failed rewrites",
                report.failure_count()
            ))
        };
        format!("{}\n{}", headline, report.summary())
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
