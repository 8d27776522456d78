//! Scrubber - the per-document engine
//!
//! A run applies, in order:
//! 1. projection (when a rule set is configured)
//! 2. pattern masking of dialog turn text
//! 3. rewriting of configured component fields (when a rewriter is attached)
//!
//! Null and empty documents short-circuit to `{}`.

use crate::config::ScrubConfig;
use crate::error::ScrubError;
use crate::masker::ContentMasker;
use crate::projection::{FieldProjector, RuleSet};
use crate::report::WalkReport;
use crate::walker::DocumentWalker;
use hush_domain::{is_empty_document, Document, Rewriter, ScrubMode};
use hush_llm::{ChatProvider, LlmError, RetryingProvider};
use serde_json::{Map, Value};
use std::fmt::Display;
use std::time::Instant;
use tracing::{debug, info, Dispatch};

/// Component holding the conversation turns
const DIALOG_KEY: &str = "dialog";

/// Result of one scrubbing run
#[derive(Debug, Clone, PartialEq)]
pub struct ScrubOutcome {
    /// The scrubbed document
    pub document: Document,
    /// Counters and failures for the run
    pub report: WalkReport,
}

/// Runs projection, masking and rewriting over documents
pub struct Scrubber {
    config: ScrubConfig,
    projector: Option<FieldProjector>,
    masker: ContentMasker,
    rewriter: Option<Box<dyn Rewriter<Error = LlmError>>>,
    dispatch: Option<Dispatch>,
}

impl Scrubber {
    /// Create a scrubber without a rewriter; runs project and mask only
    ///
    /// # Errors
    ///
    /// Returns `ScrubError::Config` if the configuration does not validate.
    pub fn new(config: ScrubConfig) -> Result<Self, ScrubError> {
        config.validate()?;

        let projector = config
            .projection
            .as_ref()
            .and_then(RuleSet::from_value)
            .map(FieldProjector::new);
        let masker = ContentMasker::new(&config.mask_patterns, config.mode);

        Ok(Self {
            config,
            projector,
            masker,
            rewriter: None,
            dispatch: None,
        })
    }

    /// Create a scrubber backed by the configured chat provider
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The configuration does not validate
    /// - The API key variable is named but not set
    /// - The HTTP client cannot be built
    pub fn connect(config: ScrubConfig) -> Result<Self, ScrubError> {
        let settings = &config.provider;
        let mut provider =
            ChatProvider::with_timeout(&settings.endpoint, &config.model, settings.timeout())?
                .for_mode(config.mode);

        if let Some(var) = settings.api_key_env.as_deref().filter(|v| !v.is_empty()) {
            let key = std::env::var(var).map_err(|_| ScrubError::MissingApiKey(var.to_string()))?;
            provider = provider.with_api_key(key);
        }

        info!(
            endpoint = %settings.endpoint,
            model = %config.model,
            mode = config.mode.as_str(),
            "connected chat provider"
        );
        Ok(Self::new(config)?.with_rewriter(provider))
    }

    /// Attach a rewriter, retried with the configured policy
    pub fn with_rewriter<R>(mut self, rewriter: R) -> Self
    where
        R: Rewriter + 'static,
        R::Error: Display,
    {
        let policy = self.config.retry.policy();
        self.rewriter = Some(Box::new(RetryingProvider::new(rewriter, policy)));
        self
    }

    /// Route this scrubber's log events to `dispatch` instead of the global default
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// The configuration in effect
    pub fn config(&self) -> &ScrubConfig {
        &self.config
    }

    /// Mode the scrubber runs in
    pub fn mode(&self) -> ScrubMode {
        self.config.mode
    }

    /// Whether rewrite calls will be made
    pub fn has_rewriter(&self) -> bool {
        self.rewriter.is_some()
    }

    /// Scrub one document. Never fails; see the report for rewrite failures.
    pub fn run(&self, document: Document) -> ScrubOutcome {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, || self.run_once(document)),
            None => self.run_once(document),
        }
    }

    fn run_once(&self, document: Document) -> ScrubOutcome {
        let started = Instant::now();
        let mut report = WalkReport::new();

        if is_empty_document(&document) {
            debug!("empty document; nothing to scrub");
            return ScrubOutcome {
                document: Value::Object(Map::new()),
                report,
            };
        }

        let mut document = match &self.projector {
            Some(projector) => projector.project(document),
            None => document,
        };

        self.mask_dialog(&mut document, &mut report);

        match &self.rewriter {
            Some(rewriter) if !self.config.transform.is_empty() => {
                DocumentWalker::new(&**rewriter, self.config.mode).walk_components(
                    &mut document,
                    &self.config.transform,
                    &mut report,
                );
            }
            _ => debug!("no rewriter or transform config; skipping rewrite pass"),
        }

        report.elapsed = started.elapsed();
        report.log(self.config.mode);
        ScrubOutcome { document, report }
    }

    fn mask_dialog(&self, document: &mut Document, report: &mut WalkReport) {
        let Some(turns) = document.get_mut(DIALOG_KEY).and_then(Value::as_array_mut) else {
            return;
        };

        for turn in turns.iter_mut().filter_map(Value::as_object_mut) {
            for field in &self.config.dialog_fields {
                let Some(Value::String(text)) = turn.get_mut(field) else {
                    continue;
                };
                let masked = self.masker.mask(Some(text.as_str()));
                if masked != *text {
                    *text = masked;
                    report.record_mask();
                }
            }
        }
    }
}

impl std::fmt::Debug for Scrubber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scrubber")
            .field("config", &self.config)
            .field("projector", &self.projector)
            .field("masker", &self.masker)
            .field("has_rewriter", &self.rewriter.is_some())
            .finish()
    }
}
