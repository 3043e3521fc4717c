//! Canonical byte encoding and content digests for habitline.
//!
//! Raw spreadsheet rows are archived under a digest of their content. The
//! digest has to be stable across column orderings and re-runs, so rows are
//! first rendered as RFC 8785 canonical JSON and then hashed with SHA-256
//! behind a domain separator.
//!
#![deny(missing_docs)]

/// Canonicalization helpers for deterministic hashing.
pub mod canonicalizer;
/// Domain-separated content hashing.
pub mod content;
/// Fixed-width digest type.
pub mod digest;
/// Validation errors for digest parsing.
pub mod validation;

pub use canonicalizer::{CanonicalizationError, Canonicalizer};
pub use content::{ContentHashError, ContentHasher};
pub use digest::{DigestAlg, RowHash};
pub use validation::ValidationError;
