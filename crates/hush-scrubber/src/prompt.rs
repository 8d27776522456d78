//! Prompt construction for rewrite calls

use hush_domain::ScrubMode;
use serde_json::Value;

const REDACT_INSTRUCTIONS: &str =
    "Redact sensitive information from the following text and return only the redacted text:";

const MINIMIZE_INSTRUCTIONS: &str = "Remove non-essential information from the following text \
and return a minimized version (or an empty string if nothing essential):";

/// Instruction line sent ahead of the field content
pub fn instructions(mode: ScrubMode) -> &'static str {
    match mode {
        ScrubMode::Redact => REDACT_INSTRUCTIONS,
        ScrubMode::Minimize => MINIMIZE_INSTRUCTIONS,
    }
}

/// Build the prompt for one field value.
///
/// Strings are embedded verbatim; any other value as compact JSON.
pub fn build_prompt(mode: ScrubMode, value: &Value) -> String {
    let text = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    format!("{}\n\n{}", instructions(mode), text)
}
