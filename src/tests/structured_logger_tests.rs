use super::*;
use tempfile::TempDir;

fn create_test_logger() -> (StructuredLogger, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = StructuredLogger::new("test-run", temp_dir.path()).expect("Failed to create logger");
    (logger, temp_dir)
}

fn read_entries(temp_dir: &TempDir) -> Vec<LogEntry> {
    let content = std::fs::read_to_string(temp_dir.path().join("events.jsonl"))
        .expect("Failed to read log file");
    content
        .lines()
        .map(|line| serde_json::from_str(line).expect("Failed to parse log entry"))
        .collect()
}

#[test]
fn test_log_entries_are_valid_json() {
    let (logger, temp_dir) = create_test_logger();

    logger.log("TestComponent", serde_json::json!({"key": "value1"}));
    logger.log("TestComponent", serde_json::json!({"key": "value2"}));

    let entries = read_entries(&temp_dir);
    assert_eq!(entries.len(), 2);
    for entry in entries {
        assert_eq!(entry.run_id, "test-run");
        assert_eq!(entry.component, "TestComponent");
    }
}

#[test]
fn test_sequence_numbers_monotonic() {
    let (logger, temp_dir) = create_test_logger();

    for i in 0..10 {
        logger.log("Test", serde_json::json!({"iteration": i}));
    }

    let mut prev_seq = 0u64;
    for entry in read_entries(&temp_dir) {
        assert!(
            entry.seq > prev_seq,
            "Sequence numbers should be monotonically increasing"
        );
        prev_seq = entry.seq;
    }
}

#[test]
fn test_rollback_event_shape() {
    let (logger, temp_dir) = create_test_logger();

    logger.log_optimistic_applied(7, StatKind::DocumentsProcessed, 6);
    logger.log_rollback(7, StatKind::DocumentsProcessed, 5, "remote unavailable: offline");

    let entries = read_entries(&temp_dir);
    assert_eq!(entries[0].event["type"], "OptimisticApplied");
    assert_eq!(entries[1].event["type"], "RolledBack");
    assert_eq!(entries[1].event["stat"], "documentsProcessed");
    assert_eq!(entries[1].event["pending_id"], 7);
    assert_eq!(entries[1].event["value"], 5);
}

#[test]
fn test_load_outcome_event() {
    let (logger, temp_dir) = create_test_logger();

    logger.log_load_outcome(Some("uid-1"), &LoadOutcome::Provisioned);

    let entries = read_entries(&temp_dir);
    assert_eq!(entries[0].component, "Stats");
    assert_eq!(entries[0].event["principal"], "uid-1");
    assert_eq!(entries[0].event["outcome"]["kind"], "provisioned");
}

#[test]
fn test_path_points_at_events_file() {
    let (logger, temp_dir) = create_test_logger();
    assert_eq!(logger.path(), &temp_dir.path().join("events.jsonl"));
}
