use serde_json::Value;

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug)]
pub enum CanonicalizationError {
    /// Provided JSON could not be canonicalized.
    #[error("invalid JSON structure: {0}")]
    InvalidStructure(String),
}

/// Canonicalizer that emits deterministic RFC 8785 bytes.
///
/// Object members are emitted in sorted key order, so two values that differ
/// only in member order produce identical bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Canonicalizer;

impl Canonicalizer {
    /// Creates a new canonicalizer.
    pub fn new() -> Self {
        Self
    }

    /// Produces canonical UTF-8 bytes for `value`.
    ///
    /// A [`Value`] cannot hold NaN or infinity, so callers that hash floats
    /// must reject them while serializing.
    pub fn canonicalize(&self, value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
        canonical_json::to_string(value)
            .map(String::into_bytes)
            .map_err(|err| CanonicalizationError::InvalidStructure(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::Canonicalizer;
    use serde_json::json;

    #[test]
    fn sorts_keys_at_every_depth() {
        let bytes = Canonicalizer::new()
            .canonicalize(&json!({"b": [{"y": 1, "x": 2}], "a": null}))
            .unwrap();
        assert_eq!(bytes, br#"{"a":null,"b":[{"x":2,"y":1}]}"#.to_vec());
    }
}
