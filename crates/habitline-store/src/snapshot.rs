use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use habitline_canonical::RowHash;
use habitline_core::{NormalizedEvent, RawRow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::memory::MemoryStore;
use crate::record::StoredEvent;
use crate::traits::{ArchiveOutcome, EventStore, RawRowArchive, UpsertOutcome};

/// Snapshot format version written by [`SnapshotStore::save`].
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    events: Vec<StoredEvent>,
    raw_rows: Vec<ArchivedRow>,
}

#[derive(Serialize, Deserialize)]
struct ArchivedRow {
    row_hash: RowHash,
    payload: RawRow,
}

/// A [`MemoryStore`] persisted as a JSON snapshot file.
///
/// The snapshot is loaded by [`SnapshotStore::open`] and written back only by
/// [`SnapshotStore::save`]; changes in between live in memory.
///
/// # Example
///
/// ```rust,no_run
/// use habitline_store::SnapshotStore;
///
/// let mut store = SnapshotStore::open("habits.snapshot.json")?;
/// // ... ingest rows ...
/// store.save()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    memory: MemoryStore,
}

impl SnapshotStore {
    /// Opens the snapshot at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be read, is not a valid
    /// snapshot, or carries an unknown version.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "snapshot not found, starting empty");
                return Ok(Self {
                    path,
                    memory: MemoryStore::new(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let file: SnapshotFile = serde_json::from_str(&text)?;
        if file.version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion(file.version));
        }

        let mut memory = MemoryStore::new();
        for event in file.events {
            memory.insert_stored(event);
        }
        for row in file.raw_rows {
            memory.insert_raw(row.row_hash, row.payload);
        }
        Ok(Self { path, memory })
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// In-memory contents.
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Writes the snapshot atomically (temporary file, then rename).
    pub fn save(&self) -> Result<(), StoreError> {
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION,
            events: self.memory.events().cloned().collect(),
            raw_rows: self
                .memory
                .raw_rows()
                .map(|(hash, row)| ArchivedRow {
                    row_hash: *hash,
                    payload: row.clone(),
                })
                .collect(),
        };
        let bytes = serde_json::to_vec_pretty(&file)?;

        let mut tmp_name = OsString::from(self.path.as_os_str());
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        fs::write(&tmp_path, bytes)?;
        fs::rename(&tmp_path, &self.path)?;
        debug!(
            path = %self.path.display(),
            events = self.memory.event_count(),
            raw_rows = self.memory.raw_row_count(),
            "snapshot saved"
        );
        Ok(())
    }
}

impl EventStore for SnapshotStore {
    fn upsert_event(
        &mut self,
        event: &NormalizedEvent,
        source: &str,
    ) -> Result<UpsertOutcome, StoreError> {
        self.memory.upsert_event(event, source)
    }
}

impl RawRowArchive for SnapshotStore {
    fn archive_row(&mut self, hash: &RowHash, row: &RawRow) -> Result<ArchiveOutcome, StoreError> {
        self.memory.archive_row(hash, row)
    }
}
