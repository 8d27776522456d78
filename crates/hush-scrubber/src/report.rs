//! Per-run counters for scrubbing
//!
//! Failure counts and timing are observability signals, not part of the
//! result's correctness. They are logged once per run and handed back so
//! callers and tests can inspect them.

use hush_domain::ScrubMode;
use std::time::Duration;
use tracing::info;

/// A field whose rewrite failed and received the fallback value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    /// Component type (`dialog`, `parties`, ...)
    pub component: String,
    /// Position of the entry in its component array
    pub entry: usize,
    /// Field name on the entry
    pub field: String,
    /// Why the rewrite was rejected
    pub reason: String,
}

/// Counters collected during one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkReport {
    /// Dialog text fields changed by pattern masking
    pub masked: usize,

    /// Fields replaced by a rewrite result
    pub rewritten: usize,

    /// Configured fields that were missing or null
    pub skipped: usize,

    /// Fields that fell back after a failed rewrite
    pub failures: Vec<FieldFailure>,

    /// Wall-clock time for the run
    pub elapsed: Duration,
}

impl WalkReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a masked dialog field
    pub fn record_mask(&mut self) {
        self.masked += 1;
    }

    /// Record a successful rewrite
    pub fn record_rewrite(&mut self) {
        self.rewritten += 1;
    }

    /// Record a field with nothing to rewrite
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Record a failed rewrite
    pub fn record_failure(
        &mut self,
        component: impl Into<String>,
        entry: usize,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.failures.push(FieldFailure {
            component: component.into(),
            entry,
            field: field.into(),
            reason: reason.into(),
        });
    }

    /// Number of failed rewrites
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Emit the per-run processing time and failure count
    pub fn log(&self, mode: ScrubMode) {
        let prefix = mode.metric_prefix();
        let processing_time = self.elapsed.as_secs_f64();
        info!(
            mode = mode.as_str(),
            processing_time,
            "{}.processing_time: {}",
            prefix,
            processing_time
        );
        info!(
            mode = mode.as_str(),
            failures = self.failure_count(),
            "{}.failures: {}",
            prefix,
            self.failure_count()
        );
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Masked fields: {}", self.masked),
            format!("Rewritten fields: {}", self.rewritten),
            format!("Skipped fields: {}", self.skipped),
            format!("Failures: {}", self.failure_count()),
        ];
        for failure in &self.failures {
            lines.push(format!(
                "  {}[{}].{}: {}",
                failure.component, failure.entry, failure.field, failure.reason
            ));
        }
        lines.push(format!("Elapsed: {:.3}s", self.elapsed.as_secs_f64()));
        lines.join("\n")
    }
}
