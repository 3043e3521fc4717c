use thiserror::Error;

/// Errors raised when parsing a rendered row hash.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Input contains characters outside `[0-9a-fA-F]` or has odd length.
    #[error("row hash '{value}' is not valid hex")]
    InvalidHex {
        /// Offending input.
        value: String,
    },
    /// Input decodes to the wrong number of bytes.
    #[error("row hash must be {expected} bytes, got {actual}")]
    WrongLength {
        /// Required byte length.
        expected: usize,
        /// Decoded byte length.
        actual: usize,
    },
}
