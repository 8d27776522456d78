//! Hush Domain Layer
//!
//! Core value types shared by every other hush crate. Nothing in here performs
//! I/O; the crate only knows how to address and reshape JSON documents.
//!
//! ## Key Concepts
//!
//! - **Document**: a conversation record (vCon-shaped JSON); no schema is enforced
//! - **FieldPath**: dotted key path with at most one `[]` array marker
//! - **ScrubMode**: redact or minimize, which fixes the marker text and the fallback
//! - **Rewriter**: the capability an external text model provides
//!
//! ## Architecture
//!
//! - Pure functions over `serde_json::Value`
//! - Total over malformed input: unresolvable paths read as absent, never panic
//! - Provider implementations live in `hush-llm`, orchestration in `hush-scrubber`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod mode;
pub mod path;
pub mod traits;

// Re-exports for convenience
pub use mode::{ScrubMode, MINIMIZED_MARKER, REDACTED_MARKER};
pub use path::{FieldPath, PathError, ARRAY_MARKER};
pub use traits::Rewriter;

/// A conversation record. Arbitrarily nested objects, arrays and scalars.
pub type Document = serde_json::Value;

/// True when a document carries nothing to process (`null` or `{}`).
pub fn is_empty_document(document: &Document) -> bool {
    match document {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
