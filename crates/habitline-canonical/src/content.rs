//! Domain-separated content hashing.
//!
//! Digests are computed as `sha256(domain_separator || canonical_bytes(value))`.

use crate::{CanonicalizationError, Canonicalizer, RowHash};
use serde::Serialize;
use sha2::{Digest as Sha2Digest, Sha256};

/// Domain separator for raw spreadsheet rows: `b"habitline:raw-row:v1\0"`.
pub const RAW_ROW_DOMAIN_SEPARATOR: &[u8] = b"habitline:raw-row:v1\0";

/// Error during content hash computation.
#[derive(thiserror::Error, Debug)]
pub enum ContentHashError {
    /// Serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
    /// Canonicalization failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Hashes serializable values under a fixed domain separator.
///
/// # Example
///
/// ```rust
/// use habitline_canonical::ContentHasher;
/// use serde_json::json;
///
/// let hasher = ContentHasher::raw_rows();
/// let a = hasher.hash(&json!({"Mood": "8", "Email Address": "a@b.c"}))?;
/// let b = hasher.hash(&json!({"Email Address": "a@b.c", "Mood": "8"}))?;
/// assert_eq!(a, b);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContentHasher {
    canonicalizer: Canonicalizer,
    domain: &'static [u8],
}

impl ContentHasher {
    /// Creates a hasher for an arbitrary domain separator.
    pub fn new(domain: &'static [u8]) -> Self {
        Self {
            canonicalizer: Canonicalizer::new(),
            domain,
        }
    }

    /// Hasher used for raw spreadsheet rows.
    pub fn raw_rows() -> Self {
        Self::new(RAW_ROW_DOMAIN_SEPARATOR)
    }

    /// Canonicalizes `value` and hashes the resulting bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ContentHashError`] if serialization or canonicalization fails.
    pub fn hash<T: Serialize + ?Sized>(&self, value: &T) -> Result<RowHash, ContentHashError> {
        let value = serde_json::to_value(value)
            .map_err(|e| ContentHashError::Serialization(e.to_string()))?;
        let canonical = self.canonicalizer.canonicalize(&value)?;

        let mut hasher = Sha256::new();
        hasher.update(self.domain);
        hasher.update(&canonical);
        let digest = hasher.finalize();

        let mut bytes = [0u8; RowHash::LEN];
        bytes.copy_from_slice(&digest);
        Ok(RowHash::from_bytes(bytes))
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::raw_rows()
    }
}
