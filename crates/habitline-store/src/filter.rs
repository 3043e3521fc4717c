//! Event filtering API for selective event listing.

use chrono::{DateTime, Utc};

use crate::record::StoredEvent;

/// Trait for filtering events during iteration.
pub trait EventFilter {
    /// Returns true if the event matches the filter criteria.
    fn matches(&self, event: &StoredEvent) -> bool;
}

/// Filter by reporter email.
#[derive(Debug, Clone)]
pub struct UserFilter {
    /// Email to match. Compared case-insensitively.
    pub user_email: String,
}

impl EventFilter for UserFilter {
    fn matches(&self, event: &StoredEvent) -> bool {
        event.user_email.eq_ignore_ascii_case(self.user_email.trim())
    }
}

/// Filter by habit id.
#[derive(Debug, Clone)]
pub struct HabitFilter {
    /// Habit id to match.
    pub habit: String,
}

impl EventFilter for HabitFilter {
    fn matches(&self, event: &StoredEvent) -> bool {
        event.habit == self.habit
    }
}

/// Filter by time range.
#[derive(Debug, Clone, Default)]
pub struct TimeRangeFilter {
    /// Include events at or after this instant.
    pub after: Option<DateTime<Utc>>,
    /// Include events at or before this instant.
    pub before: Option<DateTime<Utc>>,
}

impl EventFilter for TimeRangeFilter {
    fn matches(&self, event: &StoredEvent) -> bool {
        if let Some(after) = self.after {
            if event.timestamp < after {
                return false;
            }
        }
        if let Some(before) = self.before {
            if event.timestamp > before {
                return false;
            }
        }
        true
    }
}

/// Composite filter: all filters must match (AND).
///
/// An empty `AndFilter` matches everything.
pub struct AndFilter {
    /// Filters to combine with AND logic.
    pub filters: Vec<Box<dyn EventFilter>>,
}

impl EventFilter for AndFilter {
    fn matches(&self, event: &StoredEvent) -> bool {
        self.filters.iter().all(|f| f.matches(event))
    }
}

/// Composite filter: any filter must match (OR).
pub struct OrFilter {
    /// Filters to combine with OR logic.
    pub filters: Vec<Box<dyn EventFilter>>,
}

impl EventFilter for OrFilter {
    fn matches(&self, event: &StoredEvent) -> bool {
        self.filters.iter().any(|f| f.matches(event))
    }
}
