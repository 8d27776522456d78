//! Pattern-based content masking
//!
//! Each configured pattern is a literal, matched case-insensitively with no
//! notion of word boundaries. The first match of a pattern is masked from its
//! start to the end of the line. Patterns run once each, in order, against the
//! text left by the previous pattern.

use hush_domain::ScrubMode;
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Masks configured patterns in free text
#[derive(Debug, Clone)]
pub struct ContentMasker {
    patterns: Vec<(String, Regex)>,
    mode: ScrubMode,
}

impl ContentMasker {
    /// Compile `patterns` for `mode`. Empty patterns are ignored.
    pub fn new<I, S>(patterns: I, mode: ScrubMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter(|p| !p.as_ref().is_empty())
            .filter_map(|p| {
                let literal = p.as_ref();
                match RegexBuilder::new(&regex::escape(literal))
                    .case_insensitive(true)
                    .build()
                {
                    Ok(regex) => Some((literal.to_string(), regex)),
                    Err(e) => {
                        warn!(pattern = literal, error = %e, "skipping mask pattern");
                        None
                    }
                }
            })
            .collect();

        Self { patterns, mode }
    }

    /// Mode whose marker this masker writes
    pub fn mode(&self) -> ScrubMode {
        self.mode
    }

    /// Number of usable patterns
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Mask `text`. Absent or empty text yields an empty string.
    pub fn mask(&self, text: Option<&str>) -> String {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return String::new();
        };

        let mut result = text.to_string();
        for (literal, pattern) in &self.patterns {
            let Some(found) = pattern.find(&result) else {
                continue;
            };
            let start = found.start();
            let end = result[start..]
                .find(|c| c == '\n' || c == '\r')
                .map_or(result.len(), |offset| start + offset);

            result.replace_range(start..end, &self.replacement(literal));
        }
        result
    }

    fn replacement(&self, literal: &str) -> String {
        match self.mode {
            ScrubMode::Redact => self.mode.marker().to_string(),
            ScrubMode::Minimize => format!("{} {}", literal, self.mode.marker()),
        }
    }
}

/// One-shot form of [`ContentMasker::mask`]
pub fn mask<S: AsRef<str>>(text: Option<&str>, patterns: &[S], mode: ScrubMode) -> String {
    ContentMasker::new(patterns, mode).mask(text)
}
