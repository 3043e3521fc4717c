use habitline_canonical::{ContentHashError, ContentHasher, RowHash};

use crate::cell::RawRow;

/// Computes the archive key of a raw row.
///
/// Formula: `sha256(b"habitline:raw-row:v1\0" || canonical_json(row))`.
/// Canonical JSON sorts object keys, so the column order of the row does not
/// affect the result.
///
/// # Errors
///
/// Returns [`ContentHashError::Serialization`] if a cell holds NaN or an
/// infinity, which have no JSON encoding.
pub fn row_hash(row: &RawRow) -> Result<RowHash, ContentHashError> {
    ContentHasher::raw_rows().hash(row)
}
