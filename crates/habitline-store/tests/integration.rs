use chrono::{DateTime, Utc};
use habitline_core::{
    row_hash, CellValue, HabitConfig, HabitSpec, NormalizedEvent, RawRow, Unpivoter,
};
use habitline_store::{
    ingest, AndFilter, ArchiveOutcome, EventFilter, EventKey, EventStore, HabitFilter,
    IngestError, IngestOptions, MemoryStore, OrFilter, RawRowArchive, SnapshotStore, StoreError,
    TimeRangeFilter, UpsertOutcome, UserFilter,
};
use std::fs;
use tempfile::TempDir;

fn ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Utc)
}

fn make_event(habit: &str, value: f64, notes: Option<&str>) -> NormalizedEvent {
    NormalizedEvent {
        timestamp: ts("2025-08-20T17:00:00Z"),
        user_email: "test@example.com".to_string(),
        habit: habit.to_string(),
        value,
        notes: notes.map(str::to_string),
    }
}

fn make_config() -> HabitConfig {
    HabitConfig::new("Report Date")
        .with_notes_column("Notes")
        .with_habit("Workout", HabitSpec::boolean("workout"))
        .with_habit("Meditation (Number of Minutes)", HabitSpec::number("meditation_minutes"))
        .with_habit("Mood", HabitSpec::number("mood_score"))
}

fn make_row(date: &str, email: &str, mood: &str) -> RawRow {
    [
        ("Report Date", CellValue::from(date)),
        ("Email Address", CellValue::from(email)),
        ("Workout", CellValue::from("Yes")),
        ("Meditation (Number of Minutes)", CellValue::from("15")),
        ("Mood", CellValue::from(mood)),
        ("Notes", CellValue::from("Felt great")),
    ]
    .into_iter()
    .collect()
}

#[test]
fn upsert_inserts_then_updates() {
    let mut store = MemoryStore::new();
    let event = make_event("mood_score", 7.0, Some("first"));

    assert_eq!(
        store.upsert_event(&event, "sheets").unwrap(),
        UpsertOutcome::Inserted
    );
    assert_eq!(
        store
            .upsert_event(&make_event("mood_score", 9.0, None), "backfill")
            .unwrap(),
        UpsertOutcome::Updated
    );

    assert_eq!(store.event_count(), 1);
    let stored = store.event(&EventKey::of(&event)).unwrap();
    assert_eq!(stored.value, 9.0);
    assert_eq!(stored.notes.as_deref(), Some("first"));
    assert_eq!(stored.source, "sheets");
}

#[test]
fn upsert_merges_notes() {
    let mut store = MemoryStore::new();
    let key = EventKey::of(&make_event("workout", 1.0, None));

    store
        .upsert_event(&make_event("workout", 1.0, Some("old")), "sheets")
        .unwrap();
    store
        .upsert_event(&make_event("workout", 1.0, Some("")), "sheets")
        .unwrap();
    assert_eq!(store.event(&key).unwrap().notes.as_deref(), Some("old"));

    store
        .upsert_event(&make_event("workout", 0.0, Some("new")), "sheets")
        .unwrap();
    let stored = store.event(&key).unwrap();
    assert_eq!(stored.notes.as_deref(), Some("new"));
    assert_eq!(stored.value, 0.0);
}

#[test]
fn archive_is_a_no_op_on_conflict() {
    let mut store = MemoryStore::new();
    let row = make_row("8/20/2025", "test@example.com", "8");
    let hash = row_hash(&row).unwrap();

    assert_eq!(
        store.archive_row(&hash, &row).unwrap(),
        ArchiveOutcome::Archived
    );
    let other = make_row("8/21/2025", "test@example.com", "8");
    assert_eq!(
        store.archive_row(&hash, &other).unwrap(),
        ArchiveOutcome::AlreadyArchived
    );

    assert_eq!(store.raw_row_count(), 1);
    assert_eq!(store.raw_row(&hash), Some(&row));
}

#[test]
fn ingest_reports_counts() {
    let unpivoter = Unpivoter::new(make_config());
    let rows = vec![
        make_row("8/20/2025", "Test@Example.com", "8"),
        make_row("8/21/2025", "test@example.com", "N/A"),
        make_row("", "test@example.com", "5"),
    ];
    let mut store = MemoryStore::new();

    let report = ingest(&rows, &unpivoter, &mut store, &IngestOptions::default()).unwrap();

    assert_eq!(report.rows_seen, 3);
    assert_eq!(report.rows_skipped, 1);
    assert_eq!(report.rows_failed, 0);
    assert_eq!(report.malformed_cells, 1);
    assert_eq!(report.events_inserted, 5);
    assert_eq!(report.events_updated, 0);
    assert_eq!(report.rows_archived, 3);
    assert_eq!(store.event_count(), 5);
    assert!(store.events().all(|event| event.source == "sheets"));
}

#[test]
fn reingest_is_idempotent() {
    let unpivoter = Unpivoter::new(make_config());
    let rows = vec![
        make_row("8/20/2025", "test@example.com", "8"),
        make_row("8/21/2025", "test@example.com", "6"),
    ];
    let mut store = MemoryStore::new();

    ingest(&rows, &unpivoter, &mut store, &IngestOptions::default()).unwrap();
    let before = store.clone();
    let report = ingest(&rows, &unpivoter, &mut store, &IngestOptions::default()).unwrap();

    assert_eq!(report.events_inserted, 0);
    assert_eq!(report.events_updated, 6);
    assert_eq!(report.rows_archived, 0);
    assert_eq!(report.rows_already_archived, 2);
    assert_eq!(store, before);
}

#[test]
fn edited_row_updates_value_and_archives_new_version() {
    let unpivoter = Unpivoter::new(make_config());
    let mut store = MemoryStore::new();

    let original = vec![make_row("8/20/2025", "test@example.com", "8")];
    ingest(&original, &unpivoter, &mut store, &IngestOptions::default()).unwrap();
    let edited = vec![make_row("8/20/2025", "test@example.com", "4")];
    let report = ingest(&edited, &unpivoter, &mut store, &IngestOptions::default()).unwrap();

    assert_eq!(report.events_updated, 3);
    assert_eq!(report.rows_archived, 1);
    assert_eq!(store.raw_row_count(), 2);

    let mood = store
        .event(&EventKey {
            user_email: "test@example.com".to_string(),
            habit: "mood_score".to_string(),
            timestamp: ts("2025-08-20T17:00:00Z"),
        })
        .unwrap();
    assert_eq!(mood.value, 4.0);
}

#[test]
fn lenient_ingest_records_failures_and_continues() {
    let unpivoter = Unpivoter::new(make_config());
    let rows = vec![
        make_row("not a date", "test@example.com", "8"),
        make_row("8/21/2025", "test@example.com", "6"),
    ];
    let mut store = MemoryStore::new();

    let report = ingest(&rows, &unpivoter, &mut store, &IngestOptions::default()).unwrap();

    assert_eq!(report.rows_failed, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 0);
    assert_eq!(report.failures[0].value, "not a date");
    assert_eq!(report.events_inserted, 3);
    // The failed row is still archived.
    assert_eq!(store.raw_row_count(), 2);
}

#[test]
fn strict_ingest_aborts_before_writing_failed_row() {
    let unpivoter = Unpivoter::new(make_config());
    let rows = vec![
        make_row("8/20/2025", "test@example.com", "8"),
        make_row("not a date", "test@example.com", "8"),
        make_row("8/22/2025", "test@example.com", "8"),
    ];
    let mut store = MemoryStore::new();
    let options = IngestOptions {
        strict: true,
        ..IngestOptions::default()
    };

    let err = ingest(&rows, &unpivoter, &mut store, &options).unwrap_err();
    match err {
        IngestError::Date { index, source } => {
            assert_eq!(index, 1);
            assert_eq!(source.value, "not a date");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.raw_row_count(), 1);
    assert_eq!(store.event_count(), 3);
}

#[test]
fn reingest_under_new_source_keeps_first_label() {
    let unpivoter = Unpivoter::new(make_config());
    let rows = vec![make_row("8/20/2025", "test@example.com", "8")];
    let mut store = MemoryStore::new();
    ingest(&rows, &unpivoter, &mut store, &IngestOptions::default()).unwrap();

    let edited = vec![make_row("8/20/2025", "test@example.com", "3")];
    let backfill = IngestOptions {
        source: "backfill".to_string(),
        ..IngestOptions::default()
    };
    let report = ingest(&edited, &unpivoter, &mut store, &backfill).unwrap();

    assert_eq!(report.events_updated, 3);
    assert!(store.events().all(|event| event.source == "sheets"));
    assert!(store
        .events()
        .any(|event| event.habit == "mood_score" && event.value == 3.0));
}

#[test]
fn custom_source_label_is_stored() {
    let unpivoter = Unpivoter::new(make_config());
    let rows = vec![make_row("8/20/2025", "test@example.com", "8")];
    let mut store = MemoryStore::new();
    let options = IngestOptions {
        source: "backfill".to_string(),
        ..IngestOptions::default()
    };

    ingest(&rows, &unpivoter, &mut store, &options).unwrap();
    assert!(store.events().all(|event| event.source == "backfill"));
}

#[test]
fn snapshot_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.json");
    let unpivoter = Unpivoter::new(make_config());
    let rows = vec![
        make_row("8/20/2025", "test@example.com", "8"),
        make_row("8/21/2025", "other@example.com", "6"),
    ];

    {
        let mut store = SnapshotStore::open(&path).unwrap();
        assert_eq!(store.memory().event_count(), 0);
        ingest(&rows, &unpivoter, &mut store, &IngestOptions::default()).unwrap();
        store.save().unwrap();
    }

    let mut reopened = SnapshotStore::open(&path).unwrap();
    assert_eq!(reopened.memory().event_count(), 6);
    assert_eq!(reopened.memory().raw_row_count(), 2);
    let hash = row_hash(&rows[0]).unwrap();
    assert_eq!(reopened.memory().raw_row(&hash), Some(&rows[0]));

    let report = ingest(&rows, &unpivoter, &mut reopened, &IngestOptions::default()).unwrap();
    assert_eq!(report.events_inserted, 0);
    assert_eq!(report.rows_already_archived, 2);
    assert!(!temp_dir.path().join("store.json.tmp").exists());
}

#[test]
fn snapshot_rejects_unknown_version() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.json");
    fs::write(&path, r#"{"version":99,"events":[],"raw_rows":[]}"#).unwrap();

    let err = SnapshotStore::open(&path).unwrap_err();
    assert!(matches!(err, StoreError::UnsupportedVersion(99)));
}

#[test]
fn snapshot_rejects_garbage() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.json");
    fs::write(&path, "not json").unwrap();

    assert!(matches!(
        SnapshotStore::open(&path),
        Err(StoreError::Json(_))
    ));
}

#[test]
fn filters_select_events() {
    let unpivoter = Unpivoter::new(make_config());
    let rows = vec![
        make_row("8/20/2025", "test@example.com", "8"),
        make_row("8/21/2025", "test@example.com", "6"),
        make_row("8/21/2025", "other@example.com", "5"),
    ];
    let mut store = MemoryStore::new();
    ingest(&rows, &unpivoter, &mut store, &IngestOptions::default()).unwrap();

    let user = UserFilter {
        user_email: "Test@Example.com".to_string(),
    };
    assert_eq!(store.events_matching(&user).count(), 6);

    let mood_for_user = AndFilter {
        filters: vec![
            Box::new(user.clone()),
            Box::new(HabitFilter {
                habit: "mood_score".to_string(),
            }),
        ],
    };
    let values: Vec<f64> = store
        .events_matching(&mood_for_user)
        .map(|event| event.value)
        .collect();
    assert_eq!(values, vec![8.0, 6.0]);

    let on_21st = TimeRangeFilter {
        after: Some(ts("2025-08-21T00:00:00Z")),
        before: Some(ts("2025-08-21T23:59:59Z")),
    };
    assert_eq!(store.events_matching(&on_21st).count(), 6);
    assert!(TimeRangeFilter::default().matches(store.events().next().unwrap()));

    let either = OrFilter {
        filters: vec![
            Box::new(HabitFilter {
                habit: "workout".to_string(),
            }),
            Box::new(HabitFilter {
                habit: "mood_score".to_string(),
            }),
        ],
    };
    assert_eq!(store.events_matching(&either).count(), 6);
}
