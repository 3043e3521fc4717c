use chrono::{DateTime, Utc};
use habitline_core::NormalizedEvent;
use serde::{Deserialize, Serialize};

/// Identity of a stored event.
///
/// Field order drives the ordering of stores keyed by it: user, then habit,
/// then time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventKey {
    /// Reporter email.
    pub user_email: String,
    /// Habit id.
    pub habit: String,
    /// Report instant.
    pub timestamp: DateTime<Utc>,
}

impl EventKey {
    /// Key of a normalized event.
    pub fn of(event: &NormalizedEvent) -> Self {
        Self {
            user_email: event.user_email.clone(),
            habit: event.habit.clone(),
            timestamp: event.timestamp,
        }
    }
}

/// An event as held by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Report instant (UTC).
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    /// Reporter email.
    pub user_email: String,
    /// Habit id.
    pub habit: String,
    /// Latest value written.
    pub value: f64,
    /// Notes after merging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Label of the pipeline that first wrote the event. Kept on conflict.
    pub source: String,
}

impl StoredEvent {
    /// Stores `event` under `source`.
    pub fn new(event: &NormalizedEvent, source: &str) -> Self {
        Self {
            timestamp: event.timestamp,
            user_email: event.user_email.clone(),
            habit: event.habit.clone(),
            value: event.value,
            notes: event.notes.clone(),
            source: source.to_string(),
        }
    }

    /// Key of this event.
    pub fn key(&self) -> EventKey {
        EventKey {
            user_email: self.user_email.clone(),
            habit: self.habit.clone(),
            timestamp: self.timestamp,
        }
    }
}
