//! Hush Scrubber
//!
//! Removes or masks sensitive and non-essential fields in conversation
//! records.
//!
//! # Overview
//!
//! A run over one document has three passes:
//! - **Projection**: keep or drop fields by dotted/array path (first rule only)
//! - **Masking**: replace configured literal patterns in dialog text up to the
//!   end of the line
//! - **Rewriting**: send configured component fields to a `Rewriter`, with
//!   bounded retry and a deterministic fallback when it fails
//!
//! Runs never fail. Rewrite failures are absorbed per field and counted in the
//! run's [`WalkReport`]; processing time and failure count are logged once per
//! run under `conserver.link.redact` or `conserver.link.minimize`.
//!
//! # Usage
//!
//! ```
//! use hush_scrubber::{ScrubConfig, Scrubber};
//! use serde_json::json;
//!
//! let scrubber = Scrubber::new(ScrubConfig::redaction()).unwrap();
//! let outcome = scrubber.run(json!({
//!     "id": "test-123",
//!     "dialog": [{"content": "My SSN: 123-45-6789"}]
//! }));
//! assert_eq!(outcome.document["dialog"][0]["content"], "My [REDACTED]");
//! ```
//!
//! ## With a rewriter
//!
//! ```
//! use hush_llm::MockProvider;
//! use hush_scrubber::{FieldSelection, ScrubConfig, Scrubber};
//! use serde_json::json;
//!
//! let mut config = ScrubConfig::minimization();
//! config.retry.initial_delay_ms = 0;
//! config.retry.max_delay_ms = 0;
//! config.transform.insert(
//!     "parties".to_string(),
//!     vec![FieldSelection { fields_to_transform: vec!["name".to_string()] }],
//! );
//!
//! let scrubber = Scrubber::new(config).unwrap().with_rewriter(MockProvider::new("A."));
//! let outcome = scrubber.run(json!({"parties": [{"name": "Ann Example"}]}));
//! assert_eq!(outcome.document["parties"][0]["name"], "A.");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod masker;
pub mod projection;
pub mod prompt;
pub mod report;
pub mod scrubber;
pub mod walker;

pub use config::{
    transform_config_from_value, FieldSelection, ProviderSettings, RetrySettings, ScrubConfig,
    TransformConfig,
};
pub use error::ScrubError;
pub use masker::ContentMasker;
pub use projection::{project, FieldProjector, ProjectionAction, ProjectionRule, RuleSet};
pub use report::{FieldFailure, WalkReport};
pub use scrubber::{ScrubOutcome, Scrubber};
pub use walker::{walk, DocumentWalker, WalkOutcome};
