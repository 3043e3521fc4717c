//! Per-deployment habit configuration.
//!
//! A configuration names the row-level columns (report date, email, notes)
//! and maps each habit column of the sheet to a [`HabitSpec`]. Habit columns
//! keep the order in which the file declares them; events are emitted in that
//! order.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use chrono_tz::Tz;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::errors::ConfigError;
use crate::habit::{HabitKind, HabitSpec};

/// Email column used when the configuration does not name one.
pub const DEFAULT_EMAIL_COLUMN: &str = "Email Address";

/// Time zone used when the configuration does not name one.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Chicago;

fn default_email_column() -> String {
    DEFAULT_EMAIL_COLUMN.to_string()
}

fn default_timezone() -> Tz {
    DEFAULT_TIMEZONE
}

/// Parses an IANA zone name.
pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::UnknownTimeZone(name.to_string()))
}

mod tz_name {
    use chrono_tz::Tz;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(tz.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Tz, D::Error> {
        let name = String::deserialize(deserializer)?;
        super::parse_timezone(&name).map_err(serde::de::Error::custom)
    }
}

/// Ordered mapping from sheet column name to habit definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitColumns(Vec<(String, HabitSpec)>);

impl HabitColumns {
    /// Appends a habit column. A repeated column replaces the earlier spec.
    pub fn push(&mut self, column: impl Into<String>, spec: HabitSpec) {
        let column = column.into();
        match self.0.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = spec,
            None => self.0.push((column, spec)),
        }
    }

    /// Iterates `(column, spec)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HabitSpec)> {
        self.0.iter().map(|(column, spec)| (column.as_str(), spec))
    }

    /// Number of habit columns.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no habit columns are declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, HabitSpec)> for HabitColumns {
    fn from_iter<I: IntoIterator<Item = (K, HabitSpec)>>(iter: I) -> Self {
        let mut columns = HabitColumns::default();
        for (column, spec) in iter {
            columns.push(column, spec);
        }
        columns
    }
}

impl Serialize for HabitColumns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (column, spec) in &self.0 {
            map.serialize_entry(column, spec)?;
        }
        map.end()
    }
}

struct HabitColumnsVisitor;

impl<'de> Visitor<'de> for HabitColumnsVisitor {
    type Value = HabitColumns;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of sheet column names to habit specs")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<HabitColumns, A::Error> {
        let mut columns = HabitColumns::default();
        while let Some((column, spec)) = access.next_entry::<String, HabitSpec>()? {
            columns.push(column, spec);
        }
        Ok(columns)
    }
}

impl<'de> Deserialize<'de> for HabitColumns {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(HabitColumnsVisitor)
    }
}

/// Habit configuration, loaded once per run and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HabitConfig {
    /// Column holding the report date/time.
    pub date_column: String,
    /// Column holding the reporter's email.
    #[serde(default = "default_email_column")]
    pub email_column: String,
    /// Zone in which dates without an offset are interpreted.
    #[serde(default = "default_timezone", with = "tz_name")]
    pub timezone: Tz,
    /// Free-text columns folded into each event's notes.
    #[serde(default)]
    pub notes_columns: Vec<String>,
    /// Habit columns in emission order.
    pub habits: HabitColumns,
    /// Extra chrono date formats tried after the built-in ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_date_formats: Vec<String>,
    /// Spreadsheet the rows come from (informational).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
    /// Worksheet tab the rows come from (informational).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_name: Option<String>,
}

impl HabitConfig {
    /// Creates a configuration with defaults for everything but the date column.
    pub fn new(date_column: impl Into<String>) -> Self {
        Self {
            date_column: date_column.into(),
            email_column: default_email_column(),
            timezone: default_timezone(),
            notes_columns: Vec::new(),
            habits: HabitColumns::default(),
            extra_date_formats: Vec::new(),
            sheet_id: None,
            tab_name: None,
        }
    }

    /// Overrides the email column.
    pub fn with_email_column(mut self, column: impl Into<String>) -> Self {
        self.email_column = column.into();
        self
    }

    /// Overrides the time zone by IANA name.
    pub fn with_timezone(mut self, name: &str) -> Result<Self, ConfigError> {
        self.timezone = parse_timezone(name)?;
        Ok(self)
    }

    /// Appends a notes column.
    pub fn with_notes_column(mut self, column: impl Into<String>) -> Self {
        self.notes_columns.push(column.into());
        self
    }

    /// Appends a habit column.
    pub fn with_habit(mut self, column: impl Into<String>, spec: HabitSpec) -> Self {
        self.habits.push(column, spec);
        self
    }

    /// Appends an extra date-only format.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.extra_date_formats.push(format.into());
        self
    }

    /// Loads and validates a configuration file.
    ///
    /// Files ending in `.json` are read as JSON, everything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Parses and validates a YAML configuration.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: HabitConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: HabitConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the unpivoter relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.date_column.trim().is_empty() {
            return Err(ConfigError::EmptyField("date_column"));
        }
        if self.email_column.trim().is_empty() {
            return Err(ConfigError::EmptyField("email_column"));
        }
        if self.habits.is_empty() {
            return Err(ConfigError::NoHabits);
        }

        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (column, spec) in self.habits.iter() {
            if spec.id.trim().is_empty() {
                return Err(ConfigError::EmptyField("habits.id"));
            }
            if let Some(first) = seen.insert(spec.id.as_str(), column) {
                return Err(ConfigError::DuplicateHabitId {
                    id: spec.id.clone(),
                    first: first.to_string(),
                    second: column.to_string(),
                });
            }
            if spec.invert && spec.kind == HabitKind::Number {
                warn!(column, habit = %spec.id, "invert has no effect on numeric habits");
            }
        }

        for format in &self.extra_date_formats {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(ConfigError::InvalidDateFormat(format.clone()));
            }
        }

        Ok(())
    }
}
