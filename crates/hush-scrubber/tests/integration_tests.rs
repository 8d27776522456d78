//! Integration tests for the Scrubber

use hush_domain::ScrubMode;
use hush_llm::MockProvider;
use hush_scrubber::{
    masker::mask, project, walk, FieldProjector, ProjectionRule, RuleSet, ScrubConfig, Scrubber,
    TransformConfig,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tracing::Dispatch;

/// vCon used by most scenarios
fn sample_vcon() -> Value {
    json!({
        "version": "0.3.0",
        "id": "test-123",
        "parties": [{"name": "Ann Example", "tel": "+15550100"}],
        "dialog": [
            {
                "id": "dialog-1",
                "content": "My SSN: 123-45-6789\nThanks",
                "transcript": "Credit Card: 4111-1111-1111-1111"
            },
            {
                "id": "dialog-2",
                "content": "Password: hunter2",
                "transcript": null
            }
        ]
    })
}

/// Config file contents with zero backoff so failing scenarios stay fast
const CONFIG: &str = r#"
mode = "redact"

[[transform.parties]]
fields_to_redact = ["name"]

[retry]
max_attempts = 2
initial_delay_ms = 0
multiplier = 1
max_delay_ms = 0
"#;

#[derive(Clone)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capturing_dispatch() -> (Dispatch, Arc<Mutex<Vec<u8>>>) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer = Captured(buffer.clone());
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    (Dispatch::new(subscriber), buffer)
}

#[test]
fn test_config_file_to_scrubbed_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hush.toml");
    std::fs::write(&path, CONFIG).unwrap();

    let config = ScrubConfig::from_file(&path).unwrap();
    let scrubber = Scrubber::new(config)
        .unwrap()
        .with_rewriter(MockProvider::new("[person]"));

    let outcome = scrubber.run(sample_vcon());
    let document = &outcome.document;

    assert_eq!(document["version"], "0.3.0");
    assert_eq!(document["id"], "test-123");
    assert_eq!(document["parties"][0]["name"], "[person]");
    assert_eq!(document["parties"][0]["tel"], "+15550100");
    assert_eq!(document["dialog"][0]["content"], "My [REDACTED]\nThanks");
    assert_eq!(document["dialog"][0]["transcript"], "[REDACTED]");
    assert_eq!(document["dialog"][1]["content"], "[REDACTED]");
    assert_eq!(document["dialog"][1]["transcript"], Value::Null);

    let text = document.to_string();
    for secret in ["123-45-6789", "4111-1111-1111-1111", "hunter2"] {
        assert!(!text.contains(secret), "{} leaked", secret);
    }
    assert_eq!(outcome.report.masked, 3);
    assert_eq!(outcome.report.rewritten, 1);
}

#[test]
fn test_rewrite_fallback_counts_one_failure_per_field() {
    let transform: TransformConfig = toml::from_str(
        r#"
        [[dialog]]
        fields_to_transform = ["content", "transcript"]
        "#,
    )
    .unwrap();

    for (mode, expected) in [
        (ScrubMode::Minimize, json!([null, null])),
        (ScrubMode::Redact, json!(["[REDACTED]", null])),
    ] {
        let outcome = walk(sample_vcon(), &transform, MockProvider::failing(), mode);
        let dialog = &outcome.document["dialog"];

        assert_eq!(dialog[0]["content"], expected[0]);
        assert_eq!(dialog[1]["content"], expected[0]);
        assert_eq!(dialog[1]["transcript"], expected[1]);
        // three non-null fields failed; the null transcript was skipped
        assert_eq!(outcome.report.failure_count(), 3);
        assert_eq!(outcome.report.skipped, 1);
    }
}

#[test]
fn test_no_matching_components_leaves_document_unchanged() {
    let transform: TransformConfig = toml::from_str(
        r#"
        [[attachments]]
        fields_to_transform = ["body"]
        [[analysis]]
        fields_to_transform = ["body"]
        "#,
    )
    .unwrap();
    let provider = MockProvider::failing();

    let outcome = walk(sample_vcon(), &transform, &provider, ScrubMode::Redact);

    assert_eq!(outcome.document, sample_vcon());
    assert_eq!(outcome.report.failure_count(), 0);
    assert_eq!(provider.call_count(), 0);
}

#[test]
fn test_keep_projection_with_array_traversal() {
    let document = json!({"foo": {"bar": [{"baz": 1, "other": "x"}, {"baz": 2, "other": "y"}]}});
    let rules = RuleSet::new(vec![ProjectionRule::keep(["foo.bar[].baz"])]);

    assert_eq!(
        project(document, &rules),
        json!({"foo": {"bar": [{"baz": 1}, {"baz": 2}]}})
    );
}

#[test]
fn test_drop_of_missing_path_is_noop() {
    let projector = FieldProjector::from_config(&json!({
        "analysis": [{"fields": ["missing", "parties.nope"], "action": "drop"}]
    }));
    assert_eq!(projector.project(sample_vcon()), sample_vcon());
}

#[test]
fn test_mask_scenarios() {
    let single = mask(Some("My SSN: 123-45-6789\nOther info"), &["SSN:"], ScrubMode::Redact);
    assert!(single.contains("[REDACTED]"));
    assert!(!single.contains("123-45-6789"));

    let multi = mask(
        Some("SSN: 123-45-6789\nCredit Card: 4111-1111-1111-1111"),
        &["SSN:", "Credit Card:"],
        ScrubMode::Minimize,
    );
    assert_eq!(multi.matches("[MINIMIZED]").count(), 2);

    for mode in [ScrubMode::Redact, ScrubMode::Minimize] {
        assert_eq!(mask(Some(""), &["SSN:"], mode), "");
        assert_eq!(mask(None, &["SSN:"], mode), "");
    }
}

#[test]
fn test_run_logs_metrics_to_injected_dispatch() {
    let (dispatch, buffer) = capturing_dispatch();
    let config = ScrubConfig::from_toml(CONFIG).unwrap();
    let scrubber = Scrubber::new(config)
        .unwrap()
        .with_rewriter(MockProvider::failing())
        .with_dispatch(dispatch);

    let outcome = scrubber.run(sample_vcon());

    assert_eq!(outcome.document["parties"][0]["name"], "[REDACTED]");
    assert_eq!(outcome.report.failure_count(), 1);

    let logs = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(logs.contains("conserver.link.redact.processing_time:"));
    assert!(logs.contains("conserver.link.redact.failures: 1"));
    assert!(logs.contains("component=\"parties\"") || logs.contains("component=parties"));
}
