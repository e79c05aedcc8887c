//! Error types for evidence record validation.
//!
//! Only structural problems and misuse surface as errors. Broken linkage,
//! digest mismatches and untrusted signers are validation *results* and are
//! reported through [`crate::ArchiveTimeStampValidation`].

use crate::model::TimestampCoordinate;
use archivum_digest::DigestError;
use thiserror::Error;

/// Evidence record validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvidenceRecordError {
    /// Linkage had to be checked but the archive-timestamp carries no hash tree.
    #[error("archive-timestamp {chain}/{timestamp} requires a hash tree for linkage but has none")]
    EmptyHashTree { chain: usize, timestamp: usize },

    #[error("archive-timestamp chain {chain} contains no archive-timestamps")]
    EmptyChain { chain: usize },

    #[error("time-stamp token of archive-timestamp {chain}/{timestamp} has no message imprint")]
    MissingMessageImprint { chain: usize, timestamp: usize },

    #[error("no archive-timestamp at {chain}/{timestamp}")]
    UnknownCoordinate { chain: usize, timestamp: usize },

    #[error(transparent)]
    UnsupportedAlgorithm(#[from] DigestError),
}

impl EvidenceRecordError {
    pub(crate) fn empty_hash_tree(coordinate: TimestampCoordinate) -> Self {
        Self::EmptyHashTree {
            chain: coordinate.chain,
            timestamp: coordinate.timestamp,
        }
    }

    pub(crate) fn unknown_coordinate(coordinate: TimestampCoordinate) -> Self {
        Self::UnknownCoordinate {
            chain: coordinate.chain,
            timestamp: coordinate.timestamp,
        }
    }
}

/// Result type for evidence record operations.
pub type Result<T> = std::result::Result<T, EvidenceRecordError>;
