//! Validation of a single archive-timestamp.

use crate::error::{EvidenceRecordError, Result};
use crate::hash_tree::fold_hash_tree;
use crate::linkage::{check_linkage, required_linkage, Linkage, LinkageStatus, LinkageStrategy};
use crate::model::{ArchiveTimeStamp, DataObject, DigestValueGroup, EvidenceRecord, TimestampCoordinate};
use crate::reference::{validate_archive_data_objects, validate_linking_digest, ReferenceValidation};
use archivum_common_config::OmittedHashTreePolicy;
use archivum_common_log::spans::archive_timestamp_span;
use archivum_digest::{DigestAlgorithm, MessageDigest};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, warn};

/// Comparison of the folded hash-tree root with the token's message imprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImprintStatus {
    Intact,
    Mismatch {
        computed: MessageDigest,
        declared: MessageDigest,
    },
    /// Skipped because the archive-timestamp does not link to its predecessor.
    NotChecked,
    /// No hash tree and the policy forbids reconstructing one.
    HashTreeMissing,
}

impl ImprintStatus {
    pub fn is_intact(&self) -> bool {
        matches!(self, Self::Intact)
    }
}

/// Everything learned about one archive-timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveTimeStampValidation {
    pub coordinate: TimestampCoordinate,
    pub linkage: LinkageStatus,
    pub linking_digest: Linkage,
    pub imprint: ImprintStatus,
    /// Classified values of the first hash-tree group.
    pub references: Vec<ReferenceValidation>,
    /// Folded root; empty when the fold was not performed.
    pub root: MessageDigest,
    /// The hash tree was omitted and rebuilt from a single covered object.
    pub reconstructed_hash_tree: bool,
}

impl ArchiveTimeStampValidation {
    /// Linkage holds and the root matches the message imprint.
    ///
    /// Says nothing about the token's signature or its signer's trust.
    pub fn is_valid(&self) -> bool {
        !self.linkage.is_broken() && self.imprint.is_intact()
    }
}

/// Validates archive-timestamps of one evidence record.
pub struct ArchiveTimeStampVerifier<'a> {
    record: &'a EvidenceRecord,
    strategy: LinkageStrategy,
    omitted_hash_tree: OmittedHashTreePolicy,
}

impl<'a> ArchiveTimeStampVerifier<'a> {
    pub fn new(record: &'a EvidenceRecord, omitted_hash_tree: OmittedHashTreePolicy) -> Self {
        Self {
            record,
            strategy: LinkageStrategy::for_variant(record.variant),
            omitted_hash_tree,
        }
    }

    pub fn strategy(&self) -> LinkageStrategy {
        self.strategy
    }

    /// Validate the archive-timestamp at `coordinate`.
    ///
    /// Linkage and imprint failures are reported in the returned value;
    /// only structural problems are errors.
    pub fn verify(&self, coordinate: TimestampCoordinate) -> Result<ArchiveTimeStampValidation> {
        let _span = archive_timestamp_span(coordinate.chain, coordinate.timestamp).entered();

        let ats = self
            .record
            .archive_timestamp(coordinate)
            .ok_or_else(|| EvidenceRecordError::unknown_coordinate(coordinate))?;
        let algorithm = self.record.chains[coordinate.chain].digest_algorithm;

        let declared = &ats.timestamp.message_imprint;
        if declared.is_empty() {
            return Err(EvidenceRecordError::MissingMessageImprint {
                chain: coordinate.chain,
                timestamp: coordinate.timestamp,
            });
        }

        let linkage = required_linkage(self.strategy, self.record, coordinate)?;
        let detached = self.record.detached_contents.as_slice();

        let Some(hash_tree) = self.hash_tree(ats, algorithm, &linkage, detached, coordinate)? else {
            debug!(%coordinate, "hash tree omitted and reconstruction disabled");
            return Ok(ArchiveTimeStampValidation {
                coordinate,
                linkage: LinkageStatus::NotRequired,
                linking_digest: linkage,
                imprint: ImprintStatus::HashTreeMissing,
                references: Vec::new(),
                root: MessageDigest::empty(),
                reconstructed_hash_tree: false,
            });
        };

        let linkage_status = check_linkage(&linkage, &hash_tree, coordinate)?;

        let mut references = hash_tree
            .first()
            .map(|group| validate_archive_data_objects(algorithm, group, detached))
            .unwrap_or_default();
        validate_linking_digest(&mut references, &linkage);

        let (imprint, root) = if linkage_status.is_broken() {
            (ImprintStatus::NotChecked, MessageDigest::empty())
        } else {
            let root = fold_hash_tree(algorithm, &hash_tree, MessageDigest::empty());
            (compare_imprint(algorithm, &root, declared, coordinate), root)
        };

        Ok(ArchiveTimeStampValidation {
            coordinate,
            linkage: linkage_status,
            linking_digest: linkage,
            imprint,
            references,
            root,
            reconstructed_hash_tree: !ats.has_hash_tree(),
        })
    }

    /// The hash tree to validate against, rebuilding an omitted one when allowed.
    ///
    /// `Ok(None)` means the tree is absent, not needed for linkage, and may
    /// not be reconstructed.
    fn hash_tree(
        &self,
        ats: &'a ArchiveTimeStamp,
        algorithm: DigestAlgorithm,
        linkage: &Linkage,
        detached: &[DataObject],
        coordinate: TimestampCoordinate,
    ) -> Result<Option<Cow<'a, [DigestValueGroup]>>> {
        if ats.has_hash_tree() {
            return Ok(Some(Cow::Borrowed(ats.hash_tree.as_slice())));
        }

        match self.omitted_hash_tree {
            OmittedHashTreePolicy::Reject if linkage.is_required() => {
                Err(EvidenceRecordError::empty_hash_tree(coordinate))
            }
            OmittedHashTreePolicy::Reject => Ok(None),
            OmittedHashTreePolicy::SingleObject => {
                let value = match (linkage.digest(), detached) {
                    (Some(linking), _) => linking.value().to_vec(),
                    (None, [object]) => object.digest(algorithm).into_value(),
                    (None, objects) => {
                        warn!(
                            %coordinate,
                            supplied = objects.len(),
                            "cannot tell which data object an omitted hash tree covers"
                        );
                        Vec::new()
                    }
                };
                debug!(%coordinate, "rebuilding omitted hash tree from a single value");
                Ok(Some(Cow::Owned(vec![DigestValueGroup::new(vec![value])])))
            }
        }
    }
}

/// The imprint must be tagged with the chain's algorithm and carry the root's bytes.
fn compare_imprint(
    algorithm: DigestAlgorithm,
    root: &MessageDigest,
    declared: &MessageDigest,
    coordinate: TimestampCoordinate,
) -> ImprintStatus {
    if declared.algorithm() == Some(algorithm) && root.value() == declared.value() {
        debug!(%coordinate, "message imprint intact");
        ImprintStatus::Intact
    } else {
        warn!(%coordinate, computed = %root, declared = %declared, "message imprint mismatch");
        ImprintStatus::Mismatch {
            computed: root.clone(),
            declared: declared.clone(),
        }
    }
}
