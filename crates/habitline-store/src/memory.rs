use std::collections::BTreeMap;

use habitline_canonical::RowHash;
use habitline_core::{NormalizedEvent, RawRow};
use tracing::debug;

use crate::error::StoreError;
use crate::filter::EventFilter;
use crate::merge::merge_notes;
use crate::record::{EventKey, StoredEvent};
use crate::traits::{ArchiveOutcome, EventStore, RawRowArchive, UpsertOutcome};

/// Ordered in-memory event store and raw-row archive.
///
/// Events iterate by `(user_email, habit, timestamp)`, raw rows by hash.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    events: BTreeMap<EventKey, StoredEvent>,
    raw_rows: BTreeMap<RowHash, RawRow>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Number of archived raw rows.
    pub fn raw_row_count(&self) -> usize {
        self.raw_rows.len()
    }

    /// Looks up one event.
    pub fn event(&self, key: &EventKey) -> Option<&StoredEvent> {
        self.events.get(key)
    }

    /// All events in key order.
    pub fn events(&self) -> impl Iterator<Item = &StoredEvent> {
        self.events.values()
    }

    /// Events accepted by `filter`, in key order.
    pub fn events_matching<'a>(
        &'a self,
        filter: &'a dyn EventFilter,
    ) -> impl Iterator<Item = &'a StoredEvent> + 'a {
        self.events.values().filter(move |event| filter.matches(event))
    }

    /// Looks up an archived row.
    pub fn raw_row(&self, hash: &RowHash) -> Option<&RawRow> {
        self.raw_rows.get(hash)
    }

    /// All archived rows in hash order.
    pub fn raw_rows(&self) -> impl Iterator<Item = (&RowHash, &RawRow)> {
        self.raw_rows.iter()
    }

    pub(crate) fn insert_stored(&mut self, event: StoredEvent) {
        self.events.insert(event.key(), event);
    }

    pub(crate) fn insert_raw(&mut self, hash: RowHash, row: RawRow) {
        self.raw_rows.insert(hash, row);
    }
}

impl EventStore for MemoryStore {
    fn upsert_event(
        &mut self,
        event: &NormalizedEvent,
        source: &str,
    ) -> Result<UpsertOutcome, StoreError> {
        match self.events.get_mut(&EventKey::of(event)) {
            Some(stored) => {
                stored.value = event.value;
                stored.notes = merge_notes(stored.notes.as_deref(), event.notes.as_deref());
                debug!(user = %event.user_email, habit = %event.habit, ts = %event.timestamp, "event updated");
                Ok(UpsertOutcome::Updated)
            }
            None => {
                self.insert_stored(StoredEvent::new(event, source));
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}

impl RawRowArchive for MemoryStore {
    fn archive_row(&mut self, hash: &RowHash, row: &RawRow) -> Result<ArchiveOutcome, StoreError> {
        if self.raw_rows.contains_key(hash) {
            debug!(row_hash = %hash, "raw row already archived");
            return Ok(ArchiveOutcome::AlreadyArchived);
        }
        self.insert_raw(*hash, row.clone());
        Ok(ArchiveOutcome::Archived)
    }
}
