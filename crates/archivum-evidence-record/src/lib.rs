//! Archive-timestamp chain verification for evidence records.
//!
//! This crate validates RFC 4998 / RFC 6283 evidence records that have
//! already been parsed into an [`EvidenceRecord`]:
//! - Folding reduced hash trees into root digests ([`fold_hash_tree`])
//! - Checking that every archive-timestamp covers its predecessor, and every
//!   chain covers the chains before it ([`required_linkage`], [`check_linkage`])
//! - Validating each archive-timestamp against its token's message imprint
//!   ([`ArchiveTimeStampVerifier`])
//! - Traversing the record once, merging embedded validation data
//!   ([`EvidenceRecordTimestampSource`])
//! - Deriving proof-of-existence times ([`PoeLedger`])
//!
//! Broken links and digest mismatches are reported as data so a single
//! failing archive-timestamp never hides the results of the others.
//!
//! # Example
//!
//! ```ignore
//! let source = EvidenceRecordTimestampSource::new(record, policy.clone());
//! let acceptability = TimestampAcceptability::from_policy(&policy);
//!
//! let mut ledger = PoeLedger::new();
//! ledger.extract_acceptable(source.extract()?, &acceptability);
//! let proven_at = ledger.lowest_poe("contract.pdf");
//! ```

mod acceptability;
mod error;
mod hash_tree;
mod linkage;
mod model;
mod poe;
mod reference;
mod report;
mod sources;
mod timestamp_source;
mod token;
mod verifier;

#[cfg(any(test, feature = "test-utils"))]
pub mod testutil;

pub use acceptability::{TimestampAcceptability, TrustedCertificateSource};
pub use error::{EvidenceRecordError, Result};
pub use hash_tree::{fold_group, fold_hash_tree};
pub use linkage::{check_linkage, required_linkage, Linkage, LinkageStatus, LinkageStrategy};
pub use model::{
    ArchiveTimeStamp, ArchiveTimeStampChain, CryptographicInformation, DataObject,
    DigestValueGroup, EvidenceRecord, EvidenceRecordVariant, TimestampCoordinate,
};
pub use poe::PoeLedger;
pub use reference::{
    validate_archive_data_objects, validate_linking_digest, ReferenceKind, ReferenceValidation,
};
pub use report::{EvidenceRecordReport, Finding, TimestampReport, TimestampStatus};
pub use sources::{Identified, MergedSource};
pub use timestamp_source::{
    EvidenceRecordTimestampSource, TimestampExtraction, TimestampedObjectKind,
    TimestampedReference, ValidatedTimestamp,
};
pub use token::{CertificateToken, RevocationBinary, RevocationKind, TimestampToken};
pub use verifier::{ArchiveTimeStampValidation, ArchiveTimeStampVerifier, ImprintStatus};

/// Re-export digest primitives for convenience.
pub use archivum_digest::{DigestAlgorithm, MessageDigest};
