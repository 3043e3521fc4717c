//! Normalization pipeline for habit-tracking spreadsheets.
//!
//! This crate provides:
//! - Cell and row types for wide spreadsheet rows
//! - Declarative habit configuration (`HabitConfig`, `HabitSpec`)
//! - Date normalization from serials and assorted text formats to UTC
//! - Unpivoting of one wide row into per-habit events
//! - Content hashing of raw rows for idempotent archiving
//!
//! Core invariants:
//! - Date-only values are anchored at local noon before conversion to UTC
//! - Events follow the declared habit order; malformed habit cells are dropped
//! - Only an unreadable timestamp fails a row; blank date/email skips it
//! - Row hashes do not depend on column order
//!
#![deny(missing_docs)]

/// Cell values and raw rows.
pub mod cell;
/// Habit configuration loading and validation.
pub mod config;
/// Timestamp normalization.
pub mod date;
/// Error types for core operations.
pub mod errors;
/// Normalized events and per-row outcomes.
pub mod events;
/// Habit definitions and truthy tokens.
pub mod habit;
/// Raw row hashing.
pub mod row_hash;
/// Row unpivoting.
pub mod unpivot;

pub use cell::{CellValue, RawRow};
pub use config::{HabitColumns, HabitConfig, DEFAULT_EMAIL_COLUMN, DEFAULT_TIMEZONE};
pub use date::{DateFormat, DateNormalizer, ParseStrategy, DATE_ONLY_ANCHOR_HOUR};
pub use errors::{ConfigError, CoreError, UnparseableDate};
pub use events::{MalformedHabitValue, NormalizedEvent, RowOutcome, RowSkip};
pub use habit::{is_truthy, HabitKind, HabitSpec, TRUTHY_TOKENS};
pub use row_hash::row_hash;
pub use unpivot::{collect_notes, unpivot, Unpivoter, NOTES_SEPARATOR};

pub use chrono_tz::Tz;
pub use habitline_canonical::RowHash;
