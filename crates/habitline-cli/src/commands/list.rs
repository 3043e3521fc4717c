//! List command implementation.

use crate::output;
use chrono::{DateTime, Utc};
use habitline_store::{
    AndFilter, EventFilter, HabitFilter, SnapshotStore, TimeRangeFilter, UserFilter,
};

pub struct ListArgs {
    pub store: String,
    pub user: Option<String>,
    pub habit: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub json: bool,
}

fn parse_instant(flag: &str, value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("Invalid --{} '{}': {}", flag, value, e))
}

pub fn run(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !std::path::Path::new(&args.store).exists() {
        return Err(format!("Store not found: {}", args.store).into());
    }
    let store = SnapshotStore::open(&args.store)
        .map_err(|e| format!("Failed to open store {}: {}", args.store, e))?;

    let mut filters: Vec<Box<dyn EventFilter>> = Vec::new();
    if let Some(user_email) = args.user {
        filters.push(Box::new(UserFilter { user_email }));
    }
    if let Some(habit) = args.habit {
        filters.push(Box::new(HabitFilter { habit }));
    }
    if args.after.is_some() || args.before.is_some() {
        filters.push(Box::new(TimeRangeFilter {
            after: args
                .after
                .as_deref()
                .map(|v| parse_instant("after", v))
                .transpose()?,
            before: args
                .before
                .as_deref()
                .map(|v| parse_instant("before", v))
                .transpose()?,
        }));
    }
    let filter = AndFilter { filters };

    let mut events: Vec<_> = store.memory().events_matching(&filter).collect();
    events.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.user_email.cmp(&b.user_email))
            .then_with(|| a.habit.cmp(&b.habit))
    });

    if !args.json {
        output::print_table_header();
    }
    for event in events {
        if args.json {
            println!("{}", output::format_json(event));
        } else {
            println!("{}", output::format_stored_row(event));
        }
    }
    Ok(())
}
