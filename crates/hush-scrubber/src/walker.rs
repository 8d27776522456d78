//! Document walker
//!
//! Sends configured fields of component entries through a `Rewriter` and
//! writes the results back. Each field stands alone: a failed rewrite gets the
//! mode's fallback value and is counted, and the walk moves on.

use crate::config::TransformConfig;
use crate::prompt::build_prompt;
use crate::report::WalkReport;
use hush_domain::{Document, Rewriter, ScrubMode};
use serde_json::{Map, Value};
use std::fmt::Display;
use std::time::Instant;
use tracing::{debug, error, Dispatch};

/// Result of one walk
#[derive(Debug, Clone, PartialEq)]
pub struct WalkOutcome {
    /// The rewritten document
    pub document: Document,
    /// Counters and failures for the run
    pub report: WalkReport,
}

/// Walks component entries and rewrites configured fields
pub struct DocumentWalker<R> {
    rewriter: R,
    mode: ScrubMode,
    dispatch: Option<Dispatch>,
}

impl<R> DocumentWalker<R>
where
    R: Rewriter,
    R::Error: Display,
{
    /// Create a walker using `rewriter` in `mode`
    pub fn new(rewriter: R, mode: ScrubMode) -> Self {
        Self {
            rewriter,
            mode,
            dispatch: None,
        }
    }

    /// Route this walker's log events to `dispatch` instead of the global default
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Mode the walker runs in
    pub fn mode(&self) -> ScrubMode {
        self.mode
    }

    /// Rewrite every configured field of `document`.
    ///
    /// Never fails. Processing time and failure count are logged once at the
    /// end of the walk.
    pub fn walk(&self, document: Document, config: &TransformConfig) -> WalkOutcome {
        match &self.dispatch {
            Some(dispatch) => {
                tracing::dispatcher::with_default(dispatch, || self.timed_walk(document, config))
            }
            None => self.timed_walk(document, config),
        }
    }

    fn timed_walk(&self, mut document: Document, config: &TransformConfig) -> WalkOutcome {
        let started = Instant::now();
        let mut report = WalkReport::new();

        self.walk_components(&mut document, config, &mut report);

        report.elapsed = started.elapsed();
        report.log(self.mode);
        WalkOutcome { document, report }
    }

    /// Rewrite fields in place without timing or logging the run
    pub(crate) fn walk_components(
        &self,
        document: &mut Document,
        config: &TransformConfig,
        report: &mut WalkReport,
    ) {
        for (component, selections) in config {
            let Some(entries) = document.get_mut(component).and_then(Value::as_array_mut) else {
                debug!(component = %component, "component not present; skipping");
                continue;
            };

            for (index, entry) in entries.iter_mut().enumerate() {
                let Some(entry) = entry.as_object_mut() else {
                    continue;
                };
                for field in selections.iter().flat_map(|s| &s.fields_to_transform) {
                    self.rewrite_field(component, index, entry, field, report);
                }
            }
        }
    }

    fn rewrite_field(
        &self,
        component: &str,
        index: usize,
        entry: &mut Map<String, Value>,
        field: &str,
        report: &mut WalkReport,
    ) {
        let value = match entry.get(field) {
            None | Some(Value::Null) => {
                report.record_skip();
                return;
            }
            Some(value) => value,
        };
        let fallback = self.mode.fallback(value);
        let prompt = build_prompt(self.mode, value);

        let reason = match self.rewriter.rewrite(&prompt) {
            Ok(text) if !text.is_empty() => {
                entry.insert(field.to_string(), Value::String(text));
                report.record_rewrite();
                return;
            }
            Ok(_) => "empty rewrite result".to_string(),
            Err(e) => e.to_string(),
        };

        error!(
            component,
            entry = index,
            field,
            error = %reason,
            "rewrite failed; applying fallback"
        );
        entry.insert(field.to_string(), fallback);
        report.record_failure(component, index, field, reason);
    }
}

/// One-shot form of [`DocumentWalker::walk`]
pub fn walk<R>(
    document: Document,
    config: &TransformConfig,
    rewriter: R,
    mode: ScrubMode,
) -> WalkOutcome
where
    R: Rewriter,
    R::Error: Display,
{
    DocumentWalker::new(rewriter, mode).walk(document, config)
}
