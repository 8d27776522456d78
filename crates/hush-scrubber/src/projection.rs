//! Rule-based field projection
//!
//! A rule set is an ordered list of `{fields, action}` rules stored under the
//! `analysis` key. Only the first rule is applied; later rules are carried in
//! configuration but have no effect.
//!
//! - `keep` builds a fresh document holding only the listed paths
//! - `drop` removes the listed plain paths from the document
//!
//! Malformed rule sets, unknown actions and unparseable paths never fail the
//! projection. They degrade to a no-op and are logged.

use hush_domain::{Document, FieldPath};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Key of the rule list inside a projection config
pub const RULE_LIST_KEY: &str = "analysis";

/// What a projection rule does with its fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionAction {
    /// Keep only the listed fields
    Keep,
    /// Remove the listed fields
    Drop,
    /// Any other action string; the rule is inert
    #[serde(other)]
    Unknown,
}

/// One projection rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRule {
    /// Field paths the action applies to
    #[serde(default)]
    pub fields: Vec<String>,

    /// Action; a missing action makes the rule inert
    #[serde(default)]
    pub action: Option<ProjectionAction>,
}

impl ProjectionRule {
    /// Rule keeping `fields`
    pub fn keep<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            action: Some(ProjectionAction::Keep),
        }
    }

    /// Rule dropping `fields`
    pub fn drop<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            action: Some(ProjectionAction::Drop),
        }
    }
}

/// Ordered projection rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rules in configured order
    #[serde(rename = "analysis", default)]
    pub rules: Vec<ProjectionRule>,
}

impl RuleSet {
    /// Build a rule set from rules
    pub fn new(rules: Vec<ProjectionRule>) -> Self {
        Self { rules }
    }

    /// Read a rule set from loosely typed configuration.
    ///
    /// Returns `None` when the rule-list key is missing or its rules are not
    /// well-formed.
    pub fn from_value(config: &Value) -> Option<Self> {
        let rules = config.get(RULE_LIST_KEY)?;
        match serde_json::from_value::<Vec<ProjectionRule>>(rules.clone()) {
            Ok(rules) => Some(Self { rules }),
            Err(e) => {
                warn!(error = %e, "ignoring malformed projection rules");
                None
            }
        }
    }

    /// The rule that takes effect
    pub fn first(&self) -> Option<&ProjectionRule> {
        self.rules.first()
    }

    /// Whether there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Applies a rule set to documents
#[derive(Debug, Clone, Default)]
pub struct FieldProjector {
    rules: RuleSet,
}

impl FieldProjector {
    /// Create a projector for `rules`
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Create a projector from loosely typed configuration; malformed
    /// configuration yields a projector that changes nothing
    pub fn from_config(config: &Value) -> Self {
        Self::new(RuleSet::from_value(config).unwrap_or_default())
    }

    /// The rules in effect
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Project `document`
    pub fn project(&self, document: Document) -> Document {
        project(document, &self.rules)
    }
}

/// Apply the first rule of `rules` to `document`.
///
/// Keep returns a new document; drop and every no-op case return the input
/// document itself.
pub fn project(document: Document, rules: &RuleSet) -> Document {
    let Some(rule) = rules.first() else {
        return document;
    };
    if rules.rules.len() > 1 {
        debug!(
            ignored = rules.rules.len() - 1,
            "only the first projection rule is applied"
        );
    }

    match rule.action {
        Some(ProjectionAction::Keep) => keep_fields(&document, &rule.fields),
        Some(ProjectionAction::Drop) => drop_fields(document, &rule.fields),
        Some(ProjectionAction::Unknown) | None => {
            debug!("first projection rule has no usable action");
            document
        }
    }
}

fn keep_fields(document: &Document, fields: &[String]) -> Document {
    let mut result = Value::Object(Map::new());
    for path in fields.iter().filter_map(|raw| parse_path(raw)) {
        match path.resolve(document) {
            Some(value) if !value.is_null() => path.assign(&mut result, value),
            _ => {}
        }
    }
    result
}

fn drop_fields(mut document: Document, fields: &[String]) -> Document {
    for path in fields.iter().filter_map(|raw| parse_path(raw)) {
        if path.is_array_traversal() {
            warn!(path = %path, "drop rules do not support array paths; ignoring");
            continue;
        }
        path.remove(&mut document);
    }
    document
}

fn parse_path(raw: &str) -> Option<FieldPath> {
    FieldPath::parse(raw)
        .map_err(|e| warn!(error = %e, "skipping unusable field path"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(rule: ProjectionRule) -> RuleSet {
        RuleSet::new(vec![rule])
    }

    #[test]
    fn test_keep_simple_fields() {
        let document = json!({"abc": 123, "efg": "hello", "xyz": "should be removed"});
        let result = project(document, &rules(ProjectionRule::keep(["abc", "efg"])));
        assert_eq!(result, json!({"abc": 123, "efg": "hello"}));
    }

    #[test]
    fn test_drop_simple_fields() {
        let document = json!({"abc": 123, "efg": "hello", "xyz": "should be kept"});
        let result = project(document, &rules(ProjectionRule::drop(["abc", "efg"])));
        assert_eq!(result, json!({"xyz": "should be kept"}));
    }

    #[test]
    fn test_keep_nested_array_fields() {
        let document = json!({
            "foo": {"bar": [
                {"baz": 1, "other": "remove"},
                {"baz": 2, "other": "remove"}
            ]}
        });
        let result = project(document, &rules(ProjectionRule::keep(["foo.bar[].baz"])));
        assert_eq!(result, json!({"foo": {"bar": [{"baz": 1}, {"baz": 2}]}}));
    }

    #[test]
    fn test_keep_skips_null_and_missing() {
        let document = json!({"a": null, "b": {"c": 1}});
        let result = project(document, &rules(ProjectionRule::keep(["a", "b.c", "missing.x"])));
        assert_eq!(result, json!({"b": {"c": 1}}));
    }

    #[test]
    fn test_keep_array_prefix_not_an_array() {
        let document = json!({"dialog": "not a list", "id": "v1"});
        let result = project(document, &rules(ProjectionRule::keep(["dialog[].content", "id"])));
        assert_eq!(result, json!({"id": "v1"}));
    }

    #[test]
    fn test_drop_nested_and_missing() {
        let document = json!({"a": {"b": 1, "c": 2}, "d": 3});
        let result = project(
            document,
            &rules(ProjectionRule::drop(["a.b", "missing", "d.deeper"])),
        );
        assert_eq!(result, json!({"a": {"c": 2}, "d": 3}));
    }

    #[test]
    fn test_drop_ignores_array_paths() {
        let document = json!({"dialog": [{"content": "x"}], "id": 1});
        let result = project(
            document.clone(),
            &rules(ProjectionRule::drop(["dialog[].content"])),
        );
        assert_eq!(result, document);
    }

    #[test]
    fn test_only_first_rule_applies() {
        let document = json!({"a": 1, "b": 2, "c": 3});
        let rule_set = RuleSet::new(vec![
            ProjectionRule::keep(["a", "b"]),
            ProjectionRule::drop(["a"]),
        ]);
        assert_eq!(project(document, &rule_set), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_empty_rule_set_is_noop() {
        let document = json!({"a": 1});
        assert_eq!(project(document.clone(), &RuleSet::default()), document);
    }

    #[test]
    fn test_unknown_and_missing_action_are_noop() {
        let document = json!({"a": 1, "b": 2});
        let config = json!({"analysis": [{"fields": ["a"], "action": "shred"}]});
        assert_eq!(FieldProjector::from_config(&config).project(document.clone()), document);

        let config = json!({"analysis": [{"fields": ["a"]}]});
        assert_eq!(FieldProjector::from_config(&config).project(document.clone()), document);
    }

    #[test]
    fn test_malformed_config_is_noop() {
        let document = json!({"a": 1});
        for config in [
            json!({}),
            json!({"rules": []}),
            json!({"analysis": "keep everything"}),
            json!({"analysis": [{"fields": [1, 2], "action": "keep"}]}),
            json!(null),
        ] {
            assert_eq!(
                FieldProjector::from_config(&config).project(document.clone()),
                document,
                "config {} should be inert",
                config
            );
        }
    }

    #[test]
    fn test_invalid_paths_are_skipped() {
        let document = json!({"a": 1, "b": 2});
        let result = project(document, &rules(ProjectionRule::keep(["", "a..b", "a[].b[].c", "b"])));
        assert_eq!(result, json!({"b": 2}));
    }

    #[test]
    fn test_rule_set_deserializes_from_config_shape() {
        let config = json!({"analysis": [{"fields": ["x"], "action": "drop"}]});
        let rule_set = RuleSet::from_value(&config).unwrap();
        assert_eq!(rule_set.first(), Some(&ProjectionRule::drop(["x"])));
        assert_eq!(serde_json::to_value(&rule_set).unwrap(), config);
    }
}
