//! Classification of the values found in a first hash-tree group.

use crate::linkage::Linkage;
use crate::model::{DataObject, DigestValueGroup};
use archivum_digest::{DigestAlgorithm, MessageDigest};
use serde::{Deserialize, Serialize};
use strum::Display;

/// What a digest value in the first hash-tree group was matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReferenceKind {
    /// A detached data object.
    ArchiveDataObject,
    /// The previous archive-timestamp of the chain.
    ArchiveTimeStamp,
    /// The preceding archive-timestamp chains.
    ArchiveTimeStampSequence,
    /// Nothing known; the value references an object that was not supplied.
    OrphanReference,
}

/// Result of matching one digest value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceValidation {
    pub kind: ReferenceKind,
    /// Data object name, when the value was attributed to one.
    pub name: Option<String>,
    pub digest: MessageDigest,
    pub found: bool,
    pub intact: bool,
}

impl ReferenceValidation {
    fn orphan(digest: MessageDigest) -> Self {
        Self {
            kind: ReferenceKind::OrphanReference,
            name: None,
            digest,
            found: false,
            intact: false,
        }
    }

    fn data_object(digest: MessageDigest, name: &str, intact: bool) -> Self {
        Self {
            kind: ReferenceKind::ArchiveDataObject,
            name: Some(name.to_string()),
            digest,
            found: true,
            intact,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.found && self.intact
    }
}

/// Match every value of `group` against the detached data objects.
///
/// A value equal to an object's digest is found and intact. When the group
/// holds a single value and a single object was supplied that does not
/// match, the object is assumed to be the one covered and is reported as
/// found but altered. Anything else is an orphan reference.
pub fn validate_archive_data_objects(
    algorithm: DigestAlgorithm,
    group: &DigestValueGroup,
    detached_contents: &[DataObject],
) -> Vec<ReferenceValidation> {
    let object_digests: Vec<(&DataObject, MessageDigest)> = detached_contents
        .iter()
        .map(|object| (object, object.digest(algorithm)))
        .collect();

    group
        .digest_values
        .iter()
        .map(|value| {
            let digest = MessageDigest::new(algorithm, value.clone());
            let matching = object_digests
                .iter()
                .find(|(_, object_digest)| object_digest.value() == value.as_slice());

            match matching {
                Some((object, _)) => ReferenceValidation::data_object(digest, &object.name, true),
                None if group.len() == 1 && detached_contents.len() == 1 => {
                    ReferenceValidation::data_object(digest, &detached_contents[0].name, false)
                }
                None => ReferenceValidation::orphan(digest),
            }
        })
        .collect()
}

/// Re-label the reference that carries the linking digest.
///
/// If one of the references not yet validated equals the linking digest it
/// becomes a valid archive-timestamp (or sequence) reference. Otherwise, if
/// exactly one reference is still unvalidated, it is taken to be the broken
/// link and re-labelled as found but not intact.
pub fn validate_linking_digest(references: &mut [ReferenceValidation], linkage: &Linkage) {
    let (kind, linking) = match linkage {
        Linkage::None => return,
        Linkage::ArchiveTimeStamp(d) => (ReferenceKind::ArchiveTimeStamp, d),
        Linkage::ArchiveTimeStampSequence(d) => (ReferenceKind::ArchiveTimeStampSequence, d),
    };

    if let Some(reference) = references
        .iter_mut()
        .filter(|r| !r.intact)
        .find(|r| r.digest.value() == linking.value())
    {
        reference.kind = kind;
        reference.name = None;
        reference.found = true;
        reference.intact = true;
        return;
    }

    let mut unvalidated = references.iter_mut().filter(|r| !r.intact);
    if let (Some(reference), None) = (unvalidated.next(), unvalidated.next()) {
        reference.kind = kind;
        reference.found = !linking.is_empty();
    }
}
