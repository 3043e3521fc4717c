use habitline_core::{
    is_truthy, unpivot, CellValue, HabitConfig, HabitSpec, MalformedHabitValue, RawRow, RowSkip,
    Unpivoter, TRUTHY_TOKENS,
};

fn make_config() -> HabitConfig {
    HabitConfig::new("Report Date")
        .with_email_column("Email Address")
        .with_timezone("America/Chicago")
        .unwrap()
        .with_habit("Workout", HabitSpec::boolean("workout"))
        .with_habit(
            "Meditation (Number of Minutes)",
            HabitSpec::number("meditation_minutes"),
        )
        .with_habit("Mood", HabitSpec::number("mood_score"))
        .with_notes_column("Notes")
}

fn make_row() -> RawRow {
    [
        ("Report Date", "08/20/2025"),
        ("Email Address", "Test@Example.com"),
        ("Workout", "Yes"),
        ("Meditation (Number of Minutes)", "25"),
        ("Mood", "8"),
        ("Notes", "did intervals"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn unpivots_user_and_date_only_row() {
    let events = unpivot(&make_row(), &make_config()).unwrap();

    let habits: Vec<&str> = events.iter().map(|e| e.habit.as_str()).collect();
    assert_eq!(habits, vec!["workout", "meditation_minutes", "mood_score"]);

    let values: Vec<f64> = events.iter().map(|e| e.value).collect();
    assert_eq!(values, vec![1.0, 25.0, 8.0]);

    for event in &events {
        assert_eq!(event.user_email, "test@example.com");
        assert_eq!(event.notes.as_deref(), Some("Notes: did intervals"));
        assert_eq!(event.timestamp.to_rfc3339(), "2025-08-20T17:00:00+00:00");
    }
}

#[test]
fn two_habit_scenario() {
    let config = HabitConfig::new("Report Date")
        .with_habit("Workout", HabitSpec::boolean("workout"))
        .with_habit("Mood", HabitSpec::number("mood_score"))
        .with_notes_column("Notes");
    let row: RawRow = [
        ("Report Date", "08/20/2025"),
        ("Email Address", "Test@Example.com"),
        ("Workout", "Yes"),
        ("Mood", "8"),
        ("Notes", "did intervals"),
    ]
    .into_iter()
    .collect();

    let events = unpivot(&row, &config).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].habit, "workout");
    assert_eq!(events[0].value, 1.0);
    assert_eq!(events[1].habit, "mood_score");
    assert_eq!(events[1].value, 8.0);
}

#[test]
fn blank_habit_cell_is_skipped() {
    let mut row = make_row();
    row.insert("Workout", "");
    row.insert("Meditation (Number of Minutes)", "   ");

    let events = unpivot(&row, &make_config()).unwrap();
    let habits: Vec<&str> = events.iter().map(|e| e.habit.as_str()).collect();
    assert_eq!(habits, vec!["mood_score"]);
}

#[test]
fn absent_habit_column_is_skipped() {
    let row: RawRow = [
        ("Report Date", "8/20/2025"),
        ("Email Address", "a@b.c"),
        ("Mood", "3"),
    ]
    .into_iter()
    .collect();
    let events = unpivot(&row, &make_config()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].habit, "mood_score");
}

#[test]
fn missing_date_yields_nothing() {
    let mut row = make_row();
    row.insert("Report Date", CellValue::Empty);
    assert!(unpivot(&row, &make_config()).unwrap().is_empty());

    let row: RawRow = [("Email Address", "a@b.c"), ("Mood", "8")]
        .into_iter()
        .collect();
    assert!(unpivot(&row, &make_config()).unwrap().is_empty());
}

#[test]
fn missing_email_yields_nothing() {
    let mut row = make_row();
    row.insert("Email Address", "  ");
    assert!(unpivot(&row, &make_config()).unwrap().is_empty());
}

#[test]
fn detailed_outcome_names_missing_column() {
    let mut row = make_row();
    row.insert("Email Address", CellValue::Empty);
    let outcome = Unpivoter::new(make_config()).unpivot_detailed(&row).unwrap();
    assert_eq!(
        outcome.skipped,
        Some(RowSkip::MissingRequiredField {
            column: "Email Address".to_string()
        })
    );
    assert!(outcome.events.is_empty());
}

#[test]
fn malformed_number_is_dropped_but_siblings_survive() {
    let mut row = make_row();
    row.insert("Mood", "N/A");

    let unpivoter = Unpivoter::new(make_config());
    let outcome = unpivoter.unpivot_detailed(&row).unwrap();
    let habits: Vec<&str> = outcome.events.iter().map(|e| e.habit.as_str()).collect();
    assert_eq!(habits, vec!["workout", "meditation_minutes"]);
    assert_eq!(
        outcome.malformed,
        vec![MalformedHabitValue {
            column: "Mood".to_string(),
            raw: "N/A".to_string()
        }]
    );
    assert_eq!(outcome.skipped, None);
}

#[test]
fn non_finite_numbers_are_malformed() {
    let mut row = make_row();
    row.insert("Mood", "NaN");
    row.insert("Meditation (Number of Minutes)", "inf");
    let events = unpivot(&row, &make_config()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].habit, "workout");
}

#[test]
fn unparseable_date_fails_the_row() {
    let mut row = make_row();
    row.insert("Report Date", "sometime last week");
    let err = unpivot(&row, &make_config()).unwrap_err();
    assert_eq!(err.value, "sometime last week");
}

#[test]
fn numeric_cells_are_used_directly() {
    let mut row = make_row();
    row.insert("Report Date", 45891.0);
    row.insert("Mood", 7.5);
    row.insert("Workout", 1.0);

    let events = unpivot(&row, &make_config()).unwrap();
    assert_eq!(events[0].habit, "workout");
    assert_eq!(events[0].value, 1.0);
    assert_eq!(events[2].value, 7.5);
    assert_eq!(events[0].timestamp.to_rfc3339(), "2025-08-22T17:00:00+00:00");
}

#[test]
fn numbers_keep_sign_and_scale() {
    let mut row = make_row();
    row.insert("Mood", " -2.5e1 ");
    let events = unpivot(&row, &make_config()).unwrap();
    assert_eq!(events[2].value, -25.0);
}

#[test]
fn inversion_flips_boolean_values() {
    let config = HabitConfig::new("Report Date")
        .with_habit("Skipped Sugar", HabitSpec::boolean("no_sugar"))
        .with_habit("Had Sugar", HabitSpec::inverted("no_sugar_inverted"));
    let row: RawRow = [
        ("Report Date", "8/20/2025"),
        ("Email Address", "a@b.c"),
        ("Skipped Sugar", "yes"),
        ("Had Sugar", "yes"),
    ]
    .into_iter()
    .collect();

    let events = unpivot(&row, &config).unwrap();
    assert_eq!(events[0].value, 1.0);
    assert_eq!(events[1].value, 0.0);

    let mut row = row;
    row.insert("Had Sugar", "no");
    let events = unpivot(&row, &config).unwrap();
    assert_eq!(events[1].value, 1.0);
}

#[test]
fn non_truthy_text_is_false_not_skipped() {
    let mut row = make_row();
    row.insert("Workout", "maybe");
    let events = unpivot(&row, &make_config()).unwrap();
    assert_eq!(events[0].habit, "workout");
    assert_eq!(events[0].value, 0.0);
}

#[test]
fn truthy_tokens_are_case_insensitive() {
    assert_eq!(TRUTHY_TOKENS, ["yes", "true", "1", "y", "t", "on"]);
    for token in ["yes", "YES", " True ", "1", "y", "T", "On"] {
        assert!(is_truthy(token), "{token:?}");
    }
    for token in ["no", "0", "false", "", "yes!", "1.0", "off"] {
        assert!(!is_truthy(token), "{token:?}");
    }
}

#[test]
fn notes_join_in_configured_order() {
    let config = make_config().with_notes_column("Reflection");
    let mut row = make_row();
    row.insert("Reflection", "felt good");
    let events = unpivot(&row, &config).unwrap();
    assert_eq!(
        events[0].notes.as_deref(),
        Some("Notes: did intervals | Reflection: felt good")
    );

    row.insert("Notes", "");
    row.insert("Reflection", CellValue::Empty);
    let events = unpivot(&row, &config).unwrap();
    assert!(events.iter().all(|e| e.notes.is_none()));
}

#[test]
fn email_is_trimmed_and_lowercased() {
    let mut row = make_row();
    row.insert("Email Address", "  Mixed.Case@Example.COM \t");
    let events = unpivot(&row, &make_config()).unwrap();
    assert_eq!(events[0].user_email, "mixed.case@example.com");
}

#[test]
fn unpivot_is_deterministic() {
    let unpivoter = Unpivoter::new(make_config());
    let first = unpivoter.unpivot(&make_row()).unwrap();
    let second = unpivoter.unpivot(&make_row()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn row_column_order_does_not_change_events() {
    let reversed: RawRow = make_row()
        .iter()
        .map(|(column, value)| (column.to_string(), value.clone()))
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    assert_eq!(
        unpivot(&reversed, &make_config()).unwrap(),
        unpivot(&make_row(), &make_config()).unwrap()
    );
}

#[test]
fn extra_date_formats_from_config_are_used() {
    let config = make_config().with_date_format("%d.%m.%Y");
    let mut row = make_row();
    row.insert("Report Date", "20.08.2025");
    let events = unpivot(&row, &config).unwrap();
    assert_eq!(events[0].timestamp.to_rfc3339(), "2025-08-20T17:00:00+00:00");
}
