use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One habit observation unpivoted from a wide row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// Report instant (UTC).
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    /// Reporter email, trimmed and lowercased.
    pub user_email: String,
    /// Habit id from the configuration.
    pub habit: String,
    /// `0.0`/`1.0` for boolean habits, the parsed number otherwise.
    pub value: f64,
    /// Joined notes columns, shared by every event of the row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Why a row contributed no events without failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSkip {
    /// The date or email cell was absent or blank.
    MissingRequiredField {
        /// Column that was missing.
        column: String,
    },
}

/// A habit cell that was dropped because it did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedHabitValue {
    /// Sheet column of the cell.
    pub column: String,
    /// Cell text as found.
    pub raw: String,
}

/// Events of one row together with what was skipped along the way.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowOutcome {
    /// Events in habit-configuration order.
    pub events: Vec<NormalizedEvent>,
    /// Set when the whole row was skipped.
    pub skipped: Option<RowSkip>,
    /// Habit cells dropped as malformed.
    pub malformed: Vec<MalformedHabitValue>,
}

impl RowOutcome {
    pub(crate) fn missing(column: &str) -> Self {
        Self {
            skipped: Some(RowSkip::MissingRequiredField {
                column: column.to_string(),
            }),
            ..Self::default()
        }
    }
}
