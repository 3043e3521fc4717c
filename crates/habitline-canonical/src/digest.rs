use std::fmt;
use std::str::FromStr;

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::validation::ValidationError;

/// Supported digest algorithms for row hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DigestAlg {
    /// SHA-256 (the only algorithm in use).
    #[serde(rename = "sha-256")]
    Sha256,
}

/// Fixed-width SHA-256 digest of a raw row's canonical content.
///
/// Serializes as 64 lowercase hex characters, which is also the key used by
/// raw-row archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowHash([u8; RowHash::LEN]);

impl RowHash {
    /// Digest length in bytes.
    pub const LEN: usize = 32;

    /// Wraps raw digest bytes.
    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Digest algorithm that produced the bytes.
    pub fn alg(&self) -> DigestAlg {
        DigestAlg::Sha256
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Base64URL rendering without padding.
    pub fn to_b64(&self) -> String {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(self.0)
    }

    /// Parses a 64-character hex digest.
    pub fn parse_hex(value: &str) -> Result<Self, ValidationError> {
        let decoded = hex::decode(value).map_err(|_| ValidationError::InvalidHex {
            value: value.to_string(),
        })?;
        let actual = decoded.len();
        let bytes: [u8; Self::LEN] =
            decoded.try_into().map_err(|_| ValidationError::WrongLength {
                expected: Self::LEN,
                actual,
            })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for RowHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for RowHash {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl Serialize for RowHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RowHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}
