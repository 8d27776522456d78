//! Project command implementation.

use crate::cli::ProjectArgs;
use crate::commands::{read_document, read_input};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use hush_scrubber::projection::RULE_LIST_KEY;
use hush_scrubber::{FieldProjector, RuleSet};
use serde_json::Value;

/// Execute the project command.
pub fn execute_project(args: ProjectArgs, formatter: &Formatter) -> Result<()> {
    let projected = project_file(&args)?;
    println!("{}", formatter.document(&projected)?);
    Ok(())
}

/// Load the rule set and apply it to the input document.
pub fn project_file(args: &ProjectArgs) -> Result<Value> {
    let rules = load_rules(&read_input(Some(args.rules.as_path()))?)?;
    let document = read_document(args.input.as_deref())?;

    Ok(FieldProjector::new(rules).project(document))
}

/// Parse a rule set. Unlike a config-embedded rule set, a rules file that
/// cannot be used is an error.
pub fn load_rules(text: &str) -> Result<RuleSet> {
    let value: Value = serde_json::from_str(text)?;
    RuleSet::from_value(&value).ok_or_else(|| {
        CliError::InvalidInput(format!(
            "rules file needs a well-formed '{}' list",
            RULE_LIST_KEY
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn write(dir: &std::path::Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_project_file_keep() {
        let dir = tempfile::tempdir().unwrap();
        let args = ProjectArgs {
            rules: write(
                dir.path(),
                "rules.json",
                r#"{"analysis": [{"fields": ["id", "dialog[].content"], "action": "keep"}]}"#,
            ),
            input: Some(write(
                dir.path(),
                "vcon.json",
                r#"{"id": "v1", "dialog": [{"content": "hi", "speaker": "a"}], "parties": []}"#,
            )),
        };

        assert_eq!(
            project_file(&args).unwrap(),
            json!({"id": "v1", "dialog": [{"content": "hi"}]})
        );
    }

    #[test]
    fn test_load_rules_rejects_unusable_file() {
        assert!(matches!(load_rules(r#"{"rules": []}"#), Err(CliError::InvalidInput(_))));
        assert!(matches!(load_rules("not json"), Err(CliError::Serialization(_))));
        assert!(load_rules(r#"{"analysis": []}"#).unwrap().is_empty());
    }
}
