//! Linkage between consecutive archive-timestamps and chains.
//!
//! Every archive-timestamp after the first one of a chain must cover the
//! previous archive-timestamp; the first archive-timestamp of every chain
//! after the first one must cover all preceding chains. Coverage means the
//! linking digest appears among the values of the first hash-tree group.

use crate::error::{EvidenceRecordError, Result};
use crate::model::{
    ArchiveTimeStamp, DigestValueGroup, EvidenceRecord, EvidenceRecordVariant, TimestampCoordinate,
};
use archivum_digest::{DigestAlgorithm, DigestCalculator, MessageDigest};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DER_SEQUENCE_TAG: u8 = 0x30;

/// Decides which bytes get hashed to produce a linking digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkageStrategy {
    /// RFC 4998: the time-stamp token's DER, and a DER SEQUENCE wrapping the
    /// preceding chains.
    Asn1,
    /// RFC 6283: the canonicalised ArchiveTimeStamp element, and the
    /// canonicalised preceding chain elements in document order.
    Xml,
}

impl LinkageStrategy {
    pub fn for_variant(variant: EvidenceRecordVariant) -> Self {
        match variant {
            EvidenceRecordVariant::Asn1 => Self::Asn1,
            EvidenceRecordVariant::Xml => Self::Xml,
        }
    }

    /// Digest an archive-timestamp the way its successor in the chain covers it.
    pub fn archive_timestamp_digest(
        self,
        algorithm: DigestAlgorithm,
        archive_timestamp: &ArchiveTimeStamp,
    ) -> MessageDigest {
        match self {
            Self::Asn1 => DigestCalculator::compute(algorithm, &archive_timestamp.timestamp.encoded),
            Self::Xml => DigestCalculator::compute(algorithm, &archive_timestamp.encoded),
        }
    }

    /// Digest chains `0..chain` the way the first archive-timestamp of
    /// `chain` covers them. Always computed with that new chain's algorithm.
    pub fn preceding_chains_digest(
        self,
        algorithm: DigestAlgorithm,
        record: &EvidenceRecord,
        chain: usize,
    ) -> MessageDigest {
        let preceding = &record.chains[..chain.min(record.chains.len())];
        let content_len: usize = preceding.iter().map(|c| c.encoded.len()).sum();

        let mut calculator = DigestCalculator::new(algorithm);
        if self == Self::Asn1 {
            calculator.update(&[DER_SEQUENCE_TAG]);
            calculator.update(&der_length(content_len));
        }
        for c in preceding {
            calculator.update(&c.encoded);
        }
        calculator.finalize()
    }
}

/// DER definite-length octets for `len`.
pub(crate) fn der_length(len: usize) -> Vec<u8> {
    if len < 0x80 {
        return vec![len as u8];
    }
    let bytes = len.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    let significant = &bytes[first..];

    let mut out = Vec::with_capacity(significant.len() + 1);
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
    out
}

/// The digest an archive-timestamp has to contain, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "digest", rename_all = "snake_case")]
pub enum Linkage {
    /// The very first archive-timestamp of the record.
    None,
    /// Digest of the previous archive-timestamp in the same chain.
    ArchiveTimeStamp(MessageDigest),
    /// Digest of all preceding chains.
    ArchiveTimeStampSequence(MessageDigest),
}

impl Linkage {
    pub fn digest(&self) -> Option<&MessageDigest> {
        let digest = match self {
            Self::None => None,
            Self::ArchiveTimeStamp(d) | Self::ArchiveTimeStampSequence(d) => Some(d),
        };
        digest.filter(|d| !d.is_empty())
    }

    pub fn is_required(&self) -> bool {
        self.digest().is_some()
    }
}

/// Outcome of looking for the linking digest in the first hash-tree group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkageStatus {
    NotRequired,
    Present,
    Missing,
}

impl LinkageStatus {
    pub fn is_broken(self) -> bool {
        self == Self::Missing
    }
}

/// Work out which linking digest the archive-timestamp at `coordinate` needs.
pub fn required_linkage(
    strategy: LinkageStrategy,
    record: &EvidenceRecord,
    coordinate: TimestampCoordinate,
) -> Result<Linkage> {
    let chain = record
        .chain(coordinate.chain)
        .ok_or_else(|| EvidenceRecordError::unknown_coordinate(coordinate))?;
    let algorithm = chain.digest_algorithm;

    if let Some(previous) = record.previous_in_chain(coordinate) {
        let previous = record
            .archive_timestamp(previous)
            .ok_or_else(|| EvidenceRecordError::unknown_coordinate(previous))?;
        return Ok(Linkage::ArchiveTimeStamp(
            strategy.archive_timestamp_digest(algorithm, previous),
        ));
    }

    if coordinate.chain > 0 {
        return Ok(Linkage::ArchiveTimeStampSequence(
            strategy.preceding_chains_digest(algorithm, record, coordinate.chain),
        ));
    }

    Ok(Linkage::None)
}

/// Check that the linking digest is a member of the first hash-tree group.
pub fn check_linkage(
    linkage: &Linkage,
    hash_tree: &[DigestValueGroup],
    coordinate: TimestampCoordinate,
) -> Result<LinkageStatus> {
    let Some(digest) = linkage.digest() else {
        return Ok(LinkageStatus::NotRequired);
    };

    let first_group = hash_tree
        .first()
        .ok_or_else(|| EvidenceRecordError::empty_hash_tree(coordinate))?;

    if first_group.contains(digest.value()) {
        debug!(%coordinate, "linking digest present in first hash-tree group");
        Ok(LinkageStatus::Present)
    } else {
        warn!(%coordinate, expected = %digest, "linking digest missing from first hash-tree group");
        Ok(LinkageStatus::Missing)
    }
}
