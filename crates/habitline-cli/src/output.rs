//! Output formatting utilities.

use habitline_core::NormalizedEvent;
use habitline_store::{IngestReport, StoredEvent};

/// Formats a value as compact JSON.
pub fn format_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a normalized event as a table row.
pub fn format_event_row(event: &NormalizedEvent) -> String {
    format_row(
        &event.timestamp.to_rfc3339(),
        &event.user_email,
        &event.habit,
        event.value,
        event.notes.as_deref(),
    )
}

/// Formats a stored event as a table row.
pub fn format_stored_row(event: &StoredEvent) -> String {
    format_row(
        &event.timestamp.to_rfc3339(),
        &event.user_email,
        &event.habit,
        event.value,
        event.notes.as_deref(),
    )
}

fn format_row(ts: &str, user: &str, habit: &str, value: f64, notes: Option<&str>) -> String {
    format!(
        "{:<25} {:<30} {:<24} {:>8} {}",
        truncate(ts, 25),
        truncate(user, 30),
        truncate(habit, 24),
        value,
        notes.unwrap_or("")
    )
}

/// Prints table header.
#[allow(clippy::print_literal)]
pub fn print_table_header() {
    println!(
        "{:<25} {:<30} {:<24} {:>8} {}",
        "TS", "USER", "HABIT", "VALUE", "NOTES"
    );
    println!("{}", "-".repeat(100));
}

/// Prints an ingestion report as `key: value` lines.
pub fn print_report(report: &IngestReport) {
    println!("rows seen:             {}", report.rows_seen);
    println!("rows skipped:          {}", report.rows_skipped);
    println!("rows failed:           {}", report.rows_failed);
    println!("malformed cells:       {}", report.malformed_cells);
    println!("events inserted:       {}", report.events_inserted);
    println!("events updated:        {}", report.events_updated);
    println!("rows archived:         {}", report.rows_archived);
    println!("rows already archived: {}", report.rows_already_archived);
    for failure in &report.failures {
        println!("  row {}: unparseable date '{}'", failure.index, failure.value);
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
