//! In-memory evidence record model.
//!
//! Records arrive here already parsed; nothing in this crate mutates them.
//! Archive-timestamps are addressed by [`TimestampCoordinate`] rather than by
//! reference so validation results can point back into the record.

use crate::error::{EvidenceRecordError, Result};
use crate::token::{CertificateToken, RevocationBinary, TimestampToken};
use archivum_digest::{DigestAlgorithm, DigestCalculator, MessageDigest};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::Display;

/// Container syntax the record was parsed from.
///
/// The syntax decides which bytes are hashed when linking one
/// archive-timestamp (or chain) to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceRecordVariant {
    /// RFC 4998 (DER encoded).
    #[strum(serialize = "asn1")]
    Asn1,
    /// RFC 6283 (canonicalised XML).
    #[strum(serialize = "xml")]
    Xml,
}

/// Position of an archive-timestamp inside its evidence record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimestampCoordinate {
    pub chain: usize,
    pub timestamp: usize,
}

impl TimestampCoordinate {
    pub fn new(chain: usize, timestamp: usize) -> Self {
        Self { chain, timestamp }
    }

    /// The very first archive-timestamp of the record.
    pub fn is_initial(&self) -> bool {
        self.chain == 0 && self.timestamp == 0
    }

    /// First archive-timestamp of its chain.
    pub fn starts_chain(&self) -> bool {
        self.timestamp == 0
    }
}

impl fmt::Display for TimestampCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.chain, self.timestamp)
    }
}

/// One level of a reduced hash tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestValueGroup {
    pub digest_values: Vec<Vec<u8>>,
}

impl DigestValueGroup {
    pub fn new(digest_values: Vec<Vec<u8>>) -> Self {
        Self { digest_values }
    }

    /// Whether `value` is one of this group's members, byte for byte.
    pub fn contains(&self, value: &[u8]) -> bool {
        self.digest_values.iter().any(|v| v.as_slice() == value)
    }

    pub fn len(&self) -> usize {
        self.digest_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digest_values.is_empty()
    }
}

/// A detached data object covered by the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataObject {
    pub name: String,
    pub content: Vec<u8>,
}

impl DataObject {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Digest of the object's content.
    pub fn digest(&self, algorithm: DigestAlgorithm) -> MessageDigest {
        DigestCalculator::compute(algorithm, &self.content)
    }
}

/// Validation material carried inside the record itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptographicInformation {
    pub certificates: Vec<CertificateToken>,
    pub crls: Vec<RevocationBinary>,
    pub ocsps: Vec<RevocationBinary>,
}

impl CryptographicInformation {
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty() && self.crls.is_empty() && self.ocsps.is_empty()
    }
}

/// One element of an archive-timestamp chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveTimeStamp {
    /// Reduced hash tree; empty when the tree was omitted.
    pub hash_tree: Vec<DigestValueGroup>,
    pub timestamp: TimestampToken,
    /// Canonical encoding of the whole element (hashed for XML records).
    pub encoded: Vec<u8>,
    #[serde(default)]
    pub cryptographic_information: CryptographicInformation,
}

impl ArchiveTimeStamp {
    pub fn has_hash_tree(&self) -> bool {
        !self.hash_tree.is_empty()
    }
}

/// A run of archive-timestamps sharing one digest algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveTimeStampChain {
    pub digest_algorithm: DigestAlgorithm,
    pub archive_timestamps: Vec<ArchiveTimeStamp>,
    /// Encoding of the whole chain, used when the next chain links to it.
    pub encoded: Vec<u8>,
}

impl ArchiveTimeStampChain {
    /// Build a chain from an algorithm name, OID or XML URI.
    pub fn with_algorithm_name(
        algorithm: &str,
        archive_timestamps: Vec<ArchiveTimeStamp>,
        encoded: Vec<u8>,
    ) -> Result<Self> {
        Ok(Self {
            digest_algorithm: DigestAlgorithm::parse(algorithm)?,
            archive_timestamps,
            encoded,
        })
    }
}

/// A complete evidence record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub id: String,
    pub variant: EvidenceRecordVariant,
    pub chains: Vec<ArchiveTimeStampChain>,
    /// Data objects supplied alongside the record for validation.
    #[serde(default)]
    pub detached_contents: Vec<DataObject>,
    #[serde(default)]
    pub cryptographic_information: CryptographicInformation,
}

impl EvidenceRecord {
    /// Check the invariants the parser is expected to uphold.
    pub fn check_structure(&self) -> Result<()> {
        if let Some(chain) = self
            .chains
            .iter()
            .position(|c| c.archive_timestamps.is_empty())
        {
            return Err(EvidenceRecordError::EmptyChain { chain });
        }
        Ok(())
    }

    pub fn chain(&self, index: usize) -> Option<&ArchiveTimeStampChain> {
        self.chains.get(index)
    }

    pub fn archive_timestamp(&self, coordinate: TimestampCoordinate) -> Option<&ArchiveTimeStamp> {
        self.chains
            .get(coordinate.chain)?
            .archive_timestamps
            .get(coordinate.timestamp)
    }

    /// Every coordinate in traversal order: chains first to last, and within
    /// each chain its archive-timestamps first to last.
    pub fn coordinates(&self) -> impl Iterator<Item = TimestampCoordinate> + '_ {
        self.chains.iter().enumerate().flat_map(|(chain, c)| {
            (0..c.archive_timestamps.len()).map(move |ts| TimestampCoordinate::new(chain, ts))
        })
    }

    /// Coordinate of the archive-timestamp that precedes `coordinate` in its chain.
    pub fn previous_in_chain(&self, coordinate: TimestampCoordinate) -> Option<TimestampCoordinate> {
        coordinate
            .timestamp
            .checked_sub(1)
            .map(|ts| TimestampCoordinate::new(coordinate.chain, ts))
    }

    pub fn timestamp_count(&self) -> usize {
        self.chains.iter().map(|c| c.archive_timestamps.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::RecordBuilder;

    #[test]
    fn test_coordinates_follow_traversal_order() {
        let record = RecordBuilder::new("er-1")
            .data_object("doc.txt", b"hello")
            .chain(DigestAlgorithm::Sha256, 2)
            .chain(DigestAlgorithm::Sha512, 1)
            .build();

        let coordinates: Vec<_> = record.coordinates().collect();
        assert_eq!(
            coordinates,
            vec![
                TimestampCoordinate::new(0, 0),
                TimestampCoordinate::new(0, 1),
                TimestampCoordinate::new(1, 0),
            ]
        );
        assert_eq!(record.timestamp_count(), 3);
    }

    #[test]
    fn test_previous_in_chain() {
        let record = RecordBuilder::new("er-1")
            .data_object("doc.txt", b"hello")
            .chain(DigestAlgorithm::Sha256, 2)
            .build();

        assert_eq!(record.previous_in_chain(TimestampCoordinate::new(0, 0)), None);
        assert_eq!(
            record.previous_in_chain(TimestampCoordinate::new(0, 1)),
            Some(TimestampCoordinate::new(0, 0))
        );
    }

    #[test]
    fn test_empty_chain_is_structural_error() {
        let mut record = RecordBuilder::new("er-1")
            .data_object("doc.txt", b"hello")
            .chain(DigestAlgorithm::Sha256, 1)
            .build();
        record.chains.push(ArchiveTimeStampChain {
            digest_algorithm: DigestAlgorithm::Sha256,
            archive_timestamps: Vec::new(),
            encoded: Vec::new(),
        });

        assert_eq!(
            record.check_structure(),
            Err(EvidenceRecordError::EmptyChain { chain: 1 })
        );
    }

    #[test]
    fn test_chain_algorithm_by_name() {
        let chain = ArchiveTimeStampChain::with_algorithm_name("SHA-384", Vec::new(), Vec::new()).unwrap();
        assert_eq!(chain.digest_algorithm, DigestAlgorithm::Sha384);
        assert!(matches!(
            ArchiveTimeStampChain::with_algorithm_name("MD5", Vec::new(), Vec::new()),
            Err(EvidenceRecordError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_group_contains_is_exact() {
        let group = DigestValueGroup::new(vec![vec![1, 2, 3], vec![4, 5]]);
        assert!(group.contains(&[4, 5]));
        assert!(!group.contains(&[4]));
        assert!(!group.contains(&[1, 2, 3, 0]));
    }
}
