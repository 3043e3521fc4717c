//! Storage and ingestion for normalized habit events.
//!
//! This crate provides:
//! - `EventStore` and `RawRowArchive` traits, the two sinks of the pipeline
//! - The notes merge policy applied on event conflicts
//! - `MemoryStore` and the file-backed `SnapshotStore` reference backends
//! - Event filtering API for selective listing
//! - The `ingest` pipeline tying unpivoting, hashing and storage together
//!
//! Events are keyed by `(user_email, habit, timestamp)` and raw rows by their
//! content hash, so re-ingesting the same rows is idempotent.

#![deny(missing_docs)]

/// Error types for store operations.
pub mod error;
/// Event filtering API.
pub mod filter;
/// Ingestion pipeline.
pub mod ingest;
/// In-memory storage backend.
pub mod memory;
/// Conflict merge policy.
pub mod merge;
/// Stored event records.
pub mod record;
/// JSON snapshot storage backend.
pub mod snapshot;
/// Storage backend traits.
pub mod traits;

pub use error::StoreError;
pub use filter::{AndFilter, EventFilter, HabitFilter, OrFilter, TimeRangeFilter, UserFilter};
pub use ingest::{ingest, IngestError, IngestOptions, IngestReport, RowFailure, DEFAULT_SOURCE};
pub use memory::MemoryStore;
pub use merge::merge_notes;
pub use record::{EventKey, StoredEvent};
pub use snapshot::{SnapshotStore, SNAPSHOT_VERSION};
pub use traits::{ArchiveOutcome, EventStore, RawRowArchive, UpsertOutcome};
