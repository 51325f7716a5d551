use super::*;

#[test]
fn test_principal_rejects_empty() {
    assert!(PrincipalId::new("").is_err());
    assert!(PrincipalId::new("   ").is_err());
    assert_eq!(PrincipalId::new("uid-1").unwrap().as_str(), "uid-1");
}

#[test]
fn test_stat_kind_parsing() {
    assert_eq!(
        "questionsAsked".parse::<StatKind>().unwrap(),
        StatKind::QuestionsAsked
    );
    assert_eq!(
        "flashcards-created".parse::<StatKind>().unwrap(),
        StatKind::FlashcardsCreated
    );
    assert_eq!(
        "QUIZZES_COMPLETED".parse::<StatKind>().unwrap(),
        StatKind::QuizzesCompleted
    );
    let err = "pagesRead".parse::<StatKind>().unwrap_err();
    assert_eq!(err, UnknownStat("pagesRead".to_string()));
}

#[test]
fn test_stat_kind_serializes_as_field_name() {
    for kind in StatKind::ALL {
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, format!("\"{}\"", kind.field_name()));
    }
}

#[test]
fn test_apply_delta_clamps_at_zero() {
    let mut stats = UsageStats::default();
    stats.apply_delta(StatKind::QuestionsAsked, 2);
    assert_eq!(stats.questions_asked, 2);
    stats.apply_delta(StatKind::QuestionsAsked, -5);
    assert_eq!(stats.questions_asked, 0);
    assert_eq!(stats.documents_processed, 0);
}

#[test]
fn test_partial_record_defaults_missing_counters() {
    let json = r#"{"documentsProcessed": 4, "questionsAsked": 7, "quizzesCompleted": 1}"#;
    let record: RemoteStatsRecord = serde_json::from_str(json).unwrap();
    let stats = record.to_usage_stats();

    assert_eq!(stats.documents_processed, 4);
    assert_eq!(stats.questions_asked, 7);
    assert_eq!(stats.flashcards_created, 0);
    assert_eq!(stats.quizzes_completed, 1);
    assert!(record.created_at.is_none());
}

#[test]
fn test_record_increment_updates_timestamp_only() {
    let created = TimestampUtc::now();
    let mut record = RemoteStatsRecord::provisioned(created);
    let later = TimestampUtc(created.0 + chrono::Duration::seconds(5));

    record.increment(StatKind::FlashcardsCreated, 1, later);

    assert_eq!(record.flashcards_created, Some(1));
    assert_eq!(record.created_at, Some(created));
    assert_eq!(record.last_updated, Some(later));
}

#[test]
fn test_record_increment_materializes_missing_counter() {
    let mut record = RemoteStatsRecord::default();
    record.increment(StatKind::DocumentsProcessed, 1, TimestampUtc::now());
    assert_eq!(record.documents_processed, Some(1));
    assert_eq!(record.questions_asked, None);
}

#[test]
fn test_store_state_starts_loading() {
    let state = StoreState::default();
    assert!(state.is_loading);
    assert!(state.is_online);
    assert_eq!(state.phase, LoadPhase::Uninitialized);
    assert_eq!(state.stats, UsageStats::default());
}
