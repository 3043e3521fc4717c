//! Wide row to narrow per-habit events.

use tracing::debug;

use crate::cell::{CellValue, RawRow};
use crate::config::HabitConfig;
use crate::date::DateNormalizer;
use crate::errors::UnparseableDate;
use crate::events::{MalformedHabitValue, NormalizedEvent, RowOutcome};
use crate::habit::{HabitKind, HabitSpec};

/// Separator between notes fragments.
pub const NOTES_SEPARATOR: &str = " | ";

/// Unpivots rows under one habit configuration.
///
/// Builds its [`DateNormalizer`] once, including any extra date formats the
/// configuration declares, and reuses it for every row.
#[derive(Debug, Clone)]
pub struct Unpivoter {
    config: HabitConfig,
    normalizer: DateNormalizer,
}

impl Unpivoter {
    /// Creates an unpivoter for `config`.
    pub fn new(config: HabitConfig) -> Self {
        let normalizer = config
            .extra_date_formats
            .iter()
            .fold(DateNormalizer::new(), |normalizer, format| {
                normalizer.with_date_format(format.as_str())
            });
        Self { config, normalizer }
    }

    /// Configuration in use.
    pub fn config(&self) -> &HabitConfig {
        &self.config
    }

    /// Date normalizer in use.
    pub fn normalizer(&self) -> &DateNormalizer {
        &self.normalizer
    }

    /// Events of `row`, in habit-configuration order.
    ///
    /// Rows with a blank date or email yield no events. Malformed numeric
    /// habit cells are dropped without affecting their siblings.
    ///
    /// # Errors
    ///
    /// Returns [`UnparseableDate`] when the date cell cannot be read.
    pub fn unpivot(&self, row: &RawRow) -> Result<Vec<NormalizedEvent>, UnparseableDate> {
        self.unpivot_detailed(row).map(|outcome| outcome.events)
    }

    /// Like [`Unpivoter::unpivot`], also reporting skipped rows and cells.
    pub fn unpivot_detailed(&self, row: &RawRow) -> Result<RowOutcome, UnparseableDate> {
        let config = &self.config;

        let Some(date_cell) = row.non_blank(&config.date_column) else {
            debug!(column = %config.date_column, "row skipped: missing date");
            return Ok(RowOutcome::missing(&config.date_column));
        };
        let Some(email_cell) = row.non_blank(&config.email_column) else {
            debug!(column = %config.email_column, "row skipped: missing email");
            return Ok(RowOutcome::missing(&config.email_column));
        };

        let timestamp = self.normalizer.normalize(date_cell, config.timezone)?;
        let user_email = email_cell.to_string().trim().to_lowercase();
        let notes = collect_notes(row, &config.notes_columns);

        let mut outcome = RowOutcome::default();
        for (column, spec) in config.habits.iter() {
            let Some(cell) = row.non_blank(column) else {
                continue;
            };
            let Some(value) = habit_value(spec, cell) else {
                debug!(column, habit = %spec.id, cell = %cell, "habit cell dropped: not a number");
                outcome.malformed.push(MalformedHabitValue {
                    column: column.to_string(),
                    raw: cell.to_string(),
                });
                continue;
            };
            outcome.events.push(NormalizedEvent {
                timestamp,
                user_email: user_email.clone(),
                habit: spec.id.clone(),
                value,
                notes: notes.clone(),
            });
        }
        Ok(outcome)
    }
}

fn habit_value(spec: &HabitSpec, cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if spec.kind == HabitKind::Number => Some(*n).filter(|v| v.is_finite()),
        _ => cell.as_text().and_then(|text| spec.value_of(&text)),
    }
}

/// Joins `"<column>: <cell>"` for every non-blank notes column.
pub fn collect_notes(row: &RawRow, columns: &[String]) -> Option<String> {
    let fragments: Vec<String> = columns
        .iter()
        .filter_map(|column| {
            row.non_blank(column)
                .map(|cell| format!("{}: {}", column, cell))
        })
        .collect();
    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join(NOTES_SEPARATOR))
    }
}

/// Unpivots a single row under `config`.
///
/// Convenience wrapper that builds a fresh [`Unpivoter`]; prefer reusing one
/// when processing many rows.
pub fn unpivot(row: &RawRow, config: &HabitConfig) -> Result<Vec<NormalizedEvent>, UnparseableDate> {
    Unpivoter::new(config.clone()).unpivot(row)
}
