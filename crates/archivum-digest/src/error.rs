//! Digest errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DigestError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DigestError {
    #[error("Unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid digest length for {algorithm}: expected {expected}, got {actual}")]
    InvalidLength {
        algorithm: String,
        expected: usize,
        actual: usize,
    },

    #[error("Hex encoding error: {0}")]
    HexEncoding(#[from] hex::FromHexError),
}
