/// Security-focused integration tests
///
/// These tests verify security boundaries: symlinks, path traversal, resource limits,
/// and that text payloads are only ever parsed as data
mod common;

use std::fs;

use common::{EventLogBuilder, SparkEventBuilder, read_collection};
use eventlog_flattener::events::ExtractionError;
use eventlog_flattener::parsers::{LiteralError, parse_literal};
use eventlog_flattener::{EventExtractor, EventStore, classify_batch, load_batch};
use serde_json::json;

const NO_LIMIT: u64 = u64::MAX;

#[test]
#[cfg(unix)] // Symlinks work differently on Windows
fn test_security_symlinked_log_skipped() {
    use std::os::unix::fs::symlink;

    let workspace = EventLogBuilder::new()
        .with_events("logs/app-1", &[SparkEventBuilder::job_start(0)])
        .with_log("elsewhere/secret", "{\"Event\":\"Secret\"}\n");

    symlink(workspace.file("elsewhere/secret"), workspace.file("logs/app-2")).unwrap();

    let batch = load_batch(&workspace.file("logs"), None, NO_LIMIT).unwrap();

    assert_eq!(batch.sources, vec![workspace.file("logs/app-1")]);
    assert_eq!(batch.len(), 1);
}

#[test]
fn test_security_event_type_cannot_escape_store() {
    let hostile = ["../../outside", "/etc/passwd", "..", ".", "a\\b", "CON:"];
    let workspace = EventLogBuilder::new()
        .with_events("app", &hostile.map(SparkEventBuilder::new));
    let store = EventStore::new(workspace.file("events"));

    let batch = load_batch(&workspace.file("app"), None, NO_LIMIT).unwrap();
    let summary = classify_batch(&batch, &EventExtractor::default(), &store).unwrap();

    assert_eq!(summary.classified, hostile.len());
    for event in hostile {
        let path = store.collection_path(event);
        assert_eq!(path.parent(), Some(store.root()), "{} escaped the store", event);
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(!name.starts_with('.'), "{} produced a hidden file", event);
        assert_eq!(read_collection(&path).len(), 1);
    }

    let mut types = store.event_types().unwrap();
    let mut expected: Vec<String> = hostile.iter().map(|e| e.to_string()).collect();
    types.sort();
    expected.sort();
    assert_eq!(types, expected);
    assert!(!workspace.file("outside.json").exists());
}

#[test]
fn test_security_resource_limit_file_size() {
    let workspace = EventLogBuilder::new().with_log("app", &"{\"Event\":\"A\"}\n".repeat(100));

    let result = load_batch(&workspace.file("app"), None, 64);

    let err = result.unwrap_err();
    assert!(err.to_string().contains("File too large"), "unexpected error: {}", err);
}

#[test]
fn test_security_deeply_nested_line_is_skipped() {
    let deep = format!("{}{}", "{\"a\":".repeat(200), format!("1{}", "}".repeat(200)));
    let workspace =
        EventLogBuilder::new().with_log("app", &format!("{}\n{{\"Event\":\"A\"}}\n", deep));

    let batch = load_batch(&workspace.file("app"), None, NO_LIMIT).unwrap();

    assert_eq!(batch.len(), 1);
    assert_eq!(batch.failures.len(), 1);
}

#[test]
fn test_security_literal_parser_rejects_expressions() {
    assert!(parse_literal("__import__('os').system('true')").is_err());
    assert!(parse_literal("{'Event': open('/etc/passwd').read()}").is_err());
    assert!(parse_literal("{'Event': 'A' + 'B'}").is_err());
    assert_eq!(parse_literal("{'Event': 'A'}"), Ok(json!({"Event": "A"})));
}

#[test]
fn test_security_literal_nesting_limit() {
    let deep = format!("{}{}", "[".repeat(10_000), "]".repeat(10_000));
    assert!(matches!(parse_literal(&deep), Err(LiteralError::TooDeep { .. })));

    let extractor = EventExtractor::default();
    let text = format!("payload {} end", "{'x': ".repeat(5_000));
    assert_eq!(extractor.from_text(&text), Err(ExtractionError::NoEmbeddedLiteral));
}
