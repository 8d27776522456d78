//! Field path expressions
//!
//! A path is `segment("."segment)*`, optionally containing a single `[]`
//! marker. Without a marker it addresses a value by repeated key lookup. With
//! one, the part before the marker must resolve to an array and the part after
//! it (leading `.` stripped) is a plain path applied to every element.
//!
//! ```
//! use hush_domain::FieldPath;
//! use serde_json::json;
//!
//! let doc = json!({"foo": {"bar": [{"baz": 1, "other": "x"}, {"baz": 2}]}});
//! let path: FieldPath = "foo.bar[].baz".parse().unwrap();
//!
//! assert_eq!(path.resolve(&doc), Some(json!([{"baz": 1}, {"baz": 2}])));
//! ```

use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Marker that splits a path into an array prefix and a per-element remainder
pub const ARRAY_MARKER: &str = "[]";

/// Reasons a field path string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path string was empty
    #[error("field path is empty")]
    Empty,

    /// Two separators with nothing between them (`a..b`, `.a`, `a.`)
    #[error("field path '{0}' contains an empty segment")]
    EmptySegment(String),

    /// The array marker was not preceded by any key
    #[error("field path '{0}' has no key before the array marker")]
    MissingArrayPrefix(String),

    /// Only one level of array traversal is supported
    #[error("field path '{0}' has more than one array marker")]
    NestedArray(String),
}

/// A parsed field path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldPath {
    /// Ordinary nested key lookup
    Plain(Vec<String>),

    /// Array at `prefix`, with `remainder` applied to each element.
    /// An empty remainder addresses the whole array.
    ArraySplit {
        /// Keys leading to the array
        prefix: Vec<String>,
        /// Keys applied inside each element
        remainder: Vec<String>,
    },
}

impl FieldPath {
    /// Parse a path string
    ///
    /// # Errors
    /// Returns [`PathError`] for empty paths, empty segments, or more than one
    /// array marker.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let Some((before, after)) = raw.split_once(ARRAY_MARKER) else {
            return Ok(FieldPath::Plain(split_segments(raw, raw)?));
        };

        if after.contains(ARRAY_MARKER) {
            return Err(PathError::NestedArray(raw.to_string()));
        }

        let before = before.strip_suffix('.').unwrap_or(before);
        if before.is_empty() {
            return Err(PathError::MissingArrayPrefix(raw.to_string()));
        }
        let after = after.strip_prefix('.').unwrap_or(after);

        let remainder = if after.is_empty() {
            Vec::new()
        } else {
            split_segments(after, raw)?
        };

        Ok(FieldPath::ArraySplit {
            prefix: split_segments(before, raw)?,
            remainder,
        })
    }

    /// Whether this path walks into an array
    pub fn is_array_traversal(&self) -> bool {
        matches!(self, FieldPath::ArraySplit { .. })
    }

    /// Read the value this path addresses.
    ///
    /// Plain paths return the value as stored (which may be `null`); `None`
    /// means a key was missing or an intermediate was not an object.
    ///
    /// Array paths return `None` when the prefix is not an array. Otherwise
    /// they return an array holding one `{remainder: value}` object per element
    /// whose remainder resolved to a non-null value.
    pub fn resolve(&self, document: &Value) -> Option<Value> {
        match self {
            FieldPath::Plain(segments) => lookup(document, segments).cloned(),
            FieldPath::ArraySplit { prefix, remainder } => {
                let items = lookup(document, prefix)?.as_array()?;
                if remainder.is_empty() {
                    return Some(Value::Array(items.clone()));
                }

                let key = remainder.join(".");
                let collected = items
                    .iter()
                    .filter_map(|item| match lookup(item, remainder) {
                        Some(value) if !value.is_null() => {
                            let mut entry = Map::new();
                            entry.insert(key.clone(), value.clone());
                            Some(Value::Object(entry))
                        }
                        _ => None,
                    })
                    .collect();

                Some(Value::Array(collected))
            }
        }
    }

    /// Write `value` at this path, creating intermediate objects as needed.
    ///
    /// Intermediates that exist but are not objects are replaced. Array paths
    /// write `value` at the array prefix as-is; callers shape it beforehand.
    pub fn assign(&self, document: &mut Value, value: Value) {
        let segments = match self {
            FieldPath::Plain(segments) => segments,
            FieldPath::ArraySplit { prefix, .. } => prefix,
        };

        let Some((last, parents)) = segments.split_last() else {
            *document = value;
            return;
        };

        let mut current = document;
        for key in parents {
            current = ensure_object(current)
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        ensure_object(current).insert(last.clone(), value);
    }

    /// Delete the key this path addresses and return what was there.
    ///
    /// Missing intermediates are a no-op. Array paths are never removed.
    pub fn remove(&self, document: &mut Value) -> Option<Value> {
        let FieldPath::Plain(segments) = self else {
            return None;
        };
        let (last, parents) = segments.split_last()?;

        let mut current = document;
        for key in parents {
            current = current.as_object_mut()?.get_mut(key)?;
        }
        current.as_object_mut()?.remove(last)
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Plain(segments) => write!(f, "{}", segments.join(".")),
            FieldPath::ArraySplit { prefix, remainder } => {
                write!(f, "{}{}", prefix.join("."), ARRAY_MARKER)?;
                if !remainder.is_empty() {
                    write!(f, ".{}", remainder.join("."))?;
                }
                Ok(())
            }
        }
    }
}

fn split_segments(text: &str, raw: &str) -> Result<Vec<String>, PathError> {
    text.split('.')
        .map(|segment| {
            if segment.is_empty() {
                Err(PathError::EmptySegment(raw.to_string()))
            } else {
                Ok(segment.to_string())
            }
        })
        .collect()
}

fn lookup<'a>(document: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(document, |current, key| current.as_object()?.get(key))
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("non-object values are replaced above"),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn segments() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-z]{1,6}", 1..5)
    }

    proptest! {
        #[test]
        fn assigned_values_resolve(keys in segments(), n in any::<i64>()) {
            let path = FieldPath::parse(&keys.join(".")).unwrap();
            let mut doc = Value::Object(Map::new());
            path.assign(&mut doc, Value::from(n));
            prop_assert_eq!(path.resolve(&doc), Some(Value::from(n)));
        }

        #[test]
        fn remove_undoes_assign(keys in segments(), n in any::<i64>()) {
            let path = FieldPath::parse(&keys.join(".")).unwrap();
            let mut doc = Value::Object(Map::new());
            path.assign(&mut doc, Value::from(n));
            prop_assert_eq!(path.remove(&mut doc), Some(Value::from(n)));
            prop_assert_eq!(path.resolve(&doc), None);
        }

        #[test]
        fn parse_never_panics(raw in "[a-z.\\[\\]]{0,16}") {
            let _ = FieldPath::parse(&raw);
        }
    }
}
