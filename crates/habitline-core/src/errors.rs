use thiserror::Error;

/// A timestamp cell matched none of the recognized date/time representations.
///
/// Fatal for the row it came from: a row without a usable timestamp cannot be
/// placed in the time series.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unparseable date value '{value}'")]
pub struct UnparseableDate {
    /// The offending cell, rendered as text.
    pub value: String,
}

impl UnparseableDate {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Errors raised while loading or validating a habit configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// YAML could not be parsed into a configuration.
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// JSON could not be parsed into a configuration.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    /// A required field is present but empty.
    #[error("config field '{0}' must not be empty")]
    EmptyField(&'static str),
    /// No habit columns were configured.
    #[error("config declares no habits")]
    NoHabits,
    /// Two habit columns map to the same habit id.
    #[error("habit id '{id}' is used by both '{first}' and '{second}'")]
    DuplicateHabitId {
        /// Repeated habit id.
        id: String,
        /// First column using the id.
        first: String,
        /// Second column using the id.
        second: String,
    },
    /// The time zone is not a known IANA zone name.
    #[error("unknown time zone '{0}'")]
    UnknownTimeZone(String),
    /// An extra date format is not a valid chrono format string.
    #[error("invalid date format '{0}'")]
    InvalidDateFormat(String),
}

/// Core error types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timestamp parsing failed.
    #[error(transparent)]
    Date(#[from] UnparseableDate),
    /// Configuration failed to load or validate.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Row hashing failed.
    #[error("row hash failed: {0}")]
    Hash(#[from] habitline_canonical::ContentHashError),
}
