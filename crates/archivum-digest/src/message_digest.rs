//! Message digest values.

use crate::algorithm::DigestAlgorithm;
use crate::error::{DigestError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A digest value together with the algorithm that produced it.
///
/// [`MessageDigest::empty`] is a distinguished sentinel meaning "no digest":
/// it has no algorithm and no bytes. Hash-tree folding and linkage checks
/// use it instead of `Option` so a running digest can start out empty.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageDigest {
    algorithm: Option<DigestAlgorithm>,
    #[serde(with = "hex_bytes")]
    value: Vec<u8>,
}

impl MessageDigest {
    /// Wrap raw digest bytes.
    pub fn new(algorithm: DigestAlgorithm, value: impl Into<Vec<u8>>) -> Self {
        Self {
            algorithm: Some(algorithm),
            value: value.into(),
        }
    }

    /// Wrap raw bytes, checking they have the algorithm's output length.
    pub fn from_slice(algorithm: DigestAlgorithm, value: &[u8]) -> Result<Self> {
        if value.len() != algorithm.output_len() {
            return Err(DigestError::InvalidLength {
                algorithm: algorithm.to_string(),
                expected: algorithm.output_len(),
                actual: value.len(),
            });
        }
        Ok(Self::new(algorithm, value))
    }

    /// Parse a hex-encoded digest value.
    pub fn from_hex(algorithm: DigestAlgorithm, s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        Self::from_slice(algorithm, &bytes)
    }

    /// The empty sentinel.
    pub fn empty() -> Self {
        Self {
            algorithm: None,
            value: Vec::new(),
        }
    }

    /// Whether this is the empty sentinel (or carries no bytes).
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn algorithm(&self) -> Option<DigestAlgorithm> {
        self.algorithm
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.value)
    }

    /// Byte-for-byte equality of the digest values, ignoring the algorithm tag.
    pub fn matches(&self, value: &[u8]) -> bool {
        !self.is_empty() && self.value == value
    }
}

impl Default for MessageDigest {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for MessageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.algorithm {
            _ if self.is_empty() => write!(f, "MessageDigest(empty)"),
            Some(alg) => write!(f, "MessageDigest({}:{})", alg, self.to_hex()),
            None => write!(f, "MessageDigest(?:{})", self.to_hex()),
        }
    }
}

impl fmt::Display for MessageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
