//! Rows in, events and archived rows out.
//!
//! For every row: unpivot, hash, archive the raw row, then upsert each event.
//! Rows whose timestamp cannot be read either abort the run (strict) or are
//! recorded and skipped after their raw row is archived (lenient).

use habitline_core::{row_hash, RawRow, UnparseableDate, Unpivoter};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::traits::{ArchiveOutcome, EventStore, RawRowArchive, UpsertOutcome};

/// Source label used when none is given.
pub const DEFAULT_SOURCE: &str = "sheets";

/// Options for an ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Label stored with every upserted event.
    pub source: String,
    /// Abort on the first unparseable date instead of skipping the row.
    pub strict: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            strict: false,
        }
    }
}

/// A row that failed on its timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    /// Zero-based row index within the run.
    pub index: usize,
    /// Date cell as found.
    pub value: String,
}

/// Counters of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Rows processed.
    pub rows_seen: usize,
    /// Rows skipped for a missing date or email.
    pub rows_skipped: usize,
    /// Rows whose date could not be read.
    pub rows_failed: usize,
    /// Habit cells dropped as malformed.
    pub malformed_cells: usize,
    /// Events newly inserted.
    pub events_inserted: usize,
    /// Existing events updated.
    pub events_updated: usize,
    /// Raw rows newly archived.
    pub rows_archived: usize,
    /// Raw rows that were already archived.
    pub rows_already_archived: usize,
    /// Per-row date failures, in row order.
    pub failures: Vec<RowFailure>,
}

impl IngestReport {
    /// Total events written.
    pub fn events_written(&self) -> usize {
        self.events_inserted + self.events_updated
    }
}

/// Errors that abort an ingestion run.
#[derive(Error, Debug)]
pub enum IngestError {
    /// A row's timestamp could not be read in strict mode.
    #[error("row {index}: {source}")]
    Date {
        /// Zero-based row index.
        index: usize,
        /// Underlying parse failure.
        #[source]
        source: UnparseableDate,
    },
    /// The store rejected a write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Ingests `rows` into `store`.
///
/// # Errors
///
/// Returns [`IngestError::Date`] in strict mode when a row's timestamp cannot
/// be read; nothing from that row is written. Store failures abort the run in
/// either mode. Rows processed before the failure stay written.
pub fn ingest<'a, I, S>(
    rows: I,
    unpivoter: &Unpivoter,
    store: &mut S,
    options: &IngestOptions,
) -> Result<IngestReport, IngestError>
where
    I: IntoIterator<Item = &'a RawRow>,
    S: EventStore + RawRowArchive + ?Sized,
{
    let mut report = IngestReport::default();

    for (index, row) in rows.into_iter().enumerate() {
        report.rows_seen += 1;
        let outcome = match unpivoter.unpivot_detailed(row) {
            Ok(outcome) => Some(outcome),
            Err(source) if options.strict => return Err(IngestError::Date { index, source }),
            Err(err) => {
                warn!(row = index, value = %err.value, "row failed: unparseable date");
                report.rows_failed += 1;
                report.failures.push(RowFailure {
                    index,
                    value: err.value,
                });
                None
            }
        };

        let hash = row_hash(row).map_err(StoreError::from)?;
        match store.archive_row(&hash, row)? {
            ArchiveOutcome::Archived => report.rows_archived += 1,
            ArchiveOutcome::AlreadyArchived => report.rows_already_archived += 1,
        }

        let Some(outcome) = outcome else {
            continue;
        };
        if outcome.skipped.is_some() {
            report.rows_skipped += 1;
        }
        report.malformed_cells += outcome.malformed.len();

        for event in &outcome.events {
            match store.upsert_event(event, &options.source)? {
                UpsertOutcome::Inserted => report.events_inserted += 1,
                UpsertOutcome::Updated => report.events_updated += 1,
            }
        }
        debug!(row = index, row_hash = %hash, events = outcome.events.len(), "row ingested");
    }

    info!(
        rows = report.rows_seen,
        skipped = report.rows_skipped,
        failed = report.rows_failed,
        inserted = report.events_inserted,
        updated = report.events_updated,
        archived = report.rows_archived,
        "ingestion finished"
    );
    Ok(report)
}
