use serde::{Deserialize, Serialize};

/// Lowercase tokens that mark a boolean habit cell as done.
pub const TRUTHY_TOKENS: [&str; 6] = ["yes", "true", "1", "y", "t", "on"];

/// Returns true if the trimmed, case-folded cell text is a truthy token.
pub fn is_truthy(raw: &str) -> bool {
    let token = raw.trim().to_lowercase();
    TRUTHY_TOKENS.contains(&token.as_str())
}

/// How a habit column is encoded in the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitKind {
    /// Yes/no cell, stored as `1.0`/`0.0`.
    Bool,
    /// Free numeric cell, stored as parsed.
    Number,
}

/// Declarative definition of one tracked habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HabitSpec {
    /// Stable habit identifier written to events (not the column name).
    pub id: String,
    /// Cell encoding.
    #[serde(rename = "type")]
    pub kind: HabitKind,
    /// Flip boolean values (`1.0 - v`); ignored for numeric habits.
    #[serde(default)]
    pub invert: bool,
}

impl HabitSpec {
    /// Boolean habit.
    pub fn boolean(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: HabitKind::Bool,
            invert: false,
        }
    }

    /// Inverted boolean habit (a "yes" means the habit was missed).
    pub fn inverted(id: impl Into<String>) -> Self {
        Self {
            invert: true,
            ..Self::boolean(id)
        }
    }

    /// Numeric habit.
    pub fn number(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: HabitKind::Number,
            invert: false,
        }
    }

    /// Computes the event value for a non-blank cell.
    ///
    /// Returns `None` when a numeric cell does not hold a finite number.
    pub fn value_of(&self, raw: &str) -> Option<f64> {
        match self.kind {
            HabitKind::Bool => {
                let value = if is_truthy(raw) { 1.0 } else { 0.0 };
                Some(if self.invert { 1.0 - value } else { value })
            }
            HabitKind::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite()),
        }
    }
}
