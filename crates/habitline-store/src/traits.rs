//! Storage backend traits.
//!
//! These traits define the sinks of the ingestion pipeline. Backends own
//! their consistency; the reference backends take `&mut self` and are
//! single-owner.

use habitline_canonical::RowHash;
use habitline_core::{NormalizedEvent, RawRow};
use serde::Serialize;

use crate::error::StoreError;

/// Result of an event upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// No event existed under the key.
    Inserted,
    /// An existing event was updated in place.
    Updated,
}

/// Result of archiving a raw row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveOutcome {
    /// The row was new.
    Archived,
    /// A row with the same hash was already archived; nothing changed.
    AlreadyArchived,
}

/// Keyed storage for normalized events.
pub trait EventStore {
    /// Inserts or updates the event keyed by `(user_email, habit, timestamp)`.
    ///
    /// On conflict the value is overwritten and the notes are merged with
    /// [`merge_notes`](crate::merge_notes); the stored `source` is kept.
    /// `source` labels newly inserted events.
    fn upsert_event(
        &mut self,
        event: &NormalizedEvent,
        source: &str,
    ) -> Result<UpsertOutcome, StoreError>;
}

/// Content-addressed archive of raw rows.
pub trait RawRowArchive {
    /// Archives `row` under `hash`. Archiving an existing hash is a no-op.
    fn archive_row(&mut self, hash: &RowHash, row: &RawRow) -> Result<ArchiveOutcome, StoreError>;
}

impl<T: EventStore + ?Sized> EventStore for &mut T {
    fn upsert_event(
        &mut self,
        event: &NormalizedEvent,
        source: &str,
    ) -> Result<UpsertOutcome, StoreError> {
        (**self).upsert_event(event, source)
    }
}

impl<T: RawRowArchive + ?Sized> RawRowArchive for &mut T {
    fn archive_row(&mut self, hash: &RowHash, row: &RawRow) -> Result<ArchiveOutcome, StoreError> {
        (**self).archive_row(hash, row)
    }
}
