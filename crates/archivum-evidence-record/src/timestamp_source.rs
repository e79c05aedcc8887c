//! Evidence record traversal.
//!
//! [`EvidenceRecordTimestampSource`] walks every archive-timestamp in order,
//! validates it, works out which objects its time-stamp proves, and merges
//! the validation data embedded along the way. The walk runs at most once
//! per source; later calls return the stored result.

use crate::error::Result;
use crate::model::{CryptographicInformation, EvidenceRecord, TimestampCoordinate};
use crate::reference::{ReferenceKind, ReferenceValidation};
use crate::sources::MergedSource;
use crate::token::{CertificateToken, RevocationBinary, TimestampToken};
use crate::verifier::{ArchiveTimeStampValidation, ArchiveTimeStampVerifier};
use archivum_common_config::ValidationPolicy;
use archivum_common_log::spans::{evidence_record_span, record_error, Timer};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info};

/// Kind of object a time-stamp proves the existence of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimestampedObjectKind {
    EvidenceRecord,
    DataObject,
    Timestamp,
    Certificate,
    Revocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimestampedReference {
    pub id: String,
    pub kind: TimestampedObjectKind,
}

impl TimestampedReference {
    pub fn new(id: impl Into<String>, kind: TimestampedObjectKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// A time-stamp token together with its archive-timestamp validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedTimestamp {
    pub coordinate: TimestampCoordinate,
    pub token: TimestampToken,
    pub validation: ArchiveTimeStampValidation,
    /// Objects this time-stamp proves existed at its generation time.
    pub timestamped_references: Vec<TimestampedReference>,
}

impl ValidatedTimestamp {
    pub fn covers(&self, id: &str) -> bool {
        self.timestamped_references.iter().any(|r| r.id == id)
    }
}

/// Everything one traversal of a record produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampExtraction {
    /// In traversal order.
    pub timestamps: Vec<ValidatedTimestamp>,
    pub certificates: Vec<CertificateToken>,
    pub crls: Vec<RevocationBinary>,
    pub ocsps: Vec<RevocationBinary>,
    /// Data object matches of the record's first archive-timestamp.
    pub data_object_references: Vec<ReferenceValidation>,
}

impl TimestampExtraction {
    pub fn timestamp(&self, coordinate: TimestampCoordinate) -> Option<&ValidatedTimestamp> {
        self.timestamps.iter().find(|t| t.coordinate == coordinate)
    }
}

/// Produces validated time-stamps for one evidence record.
pub struct EvidenceRecordTimestampSource {
    record: EvidenceRecord,
    policy: ValidationPolicy,
    extraction: OnceCell<TimestampExtraction>,
}

impl EvidenceRecordTimestampSource {
    pub fn new(record: EvidenceRecord, policy: ValidationPolicy) -> Self {
        Self {
            record,
            policy,
            extraction: OnceCell::new(),
        }
    }

    pub fn record(&self) -> &EvidenceRecord {
        &self.record
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Whether a traversal has already completed.
    pub fn is_extracted(&self) -> bool {
        self.extraction.get().is_some()
    }

    /// Traverse the record on first use and return the stored result after.
    ///
    /// A failed traversal is not stored; the next call tries again.
    pub fn extract(&self) -> Result<&TimestampExtraction> {
        self.extraction.get_or_try_init(|| self.traverse())
    }

    pub fn timestamps(&self) -> Result<&[ValidatedTimestamp]> {
        Ok(&self.extract()?.timestamps)
    }

    pub fn certificates(&self) -> Result<&[CertificateToken]> {
        Ok(&self.extract()?.certificates)
    }

    pub fn crls(&self) -> Result<&[RevocationBinary]> {
        Ok(&self.extract()?.crls)
    }

    pub fn ocsps(&self) -> Result<&[RevocationBinary]> {
        Ok(&self.extract()?.ocsps)
    }

    fn traverse(&self) -> Result<TimestampExtraction> {
        let _span = evidence_record_span(&self.record.id).entered();
        let timer = Timer::start("evidence_record_traversal");

        self.record.check_structure().map_err(|e| {
            record_error(&e);
            e
        })?;
        let verifier = ArchiveTimeStampVerifier::new(&self.record, self.policy.omitted_hash_tree);

        let record_info = &self.record.cryptographic_information;
        let mut certificates = MergedSource::new();
        let mut crls = MergedSource::new();
        let mut ocsps = MergedSource::new();
        certificates.extend(&record_info.certificates);
        crls.extend(&record_info.crls);
        ocsps.extend(&record_info.ocsps);

        let mut data_object_references: Vec<ReferenceValidation> = Vec::new();
        let mut data_object_proofs: Vec<TimestampedReference> = Vec::new();
        let mut previous_timestamp: Vec<TimestampedReference> = Vec::new();
        let mut previous_chain: Vec<TimestampedReference> = Vec::new();
        let mut validation_data: Vec<TimestampedReference> = Vec::new();
        let mut timestamps = Vec::with_capacity(self.record.timestamp_count());

        for coordinate in self.record.coordinates() {
            let validation = verifier.verify(coordinate).map_err(|e| {
                record_error(&e);
                e
            })?;
            let chain = &self.record.chains[coordinate.chain];
            let ats = &chain.archive_timestamps[coordinate.timestamp];

            if coordinate.is_initial() {
                data_object_references = validation
                    .references
                    .iter()
                    .filter(|r| r.kind == ReferenceKind::ArchiveDataObject)
                    .cloned()
                    .collect();
                data_object_proofs = data_object_references
                    .iter()
                    .filter(|r| r.is_valid())
                    .filter_map(|r| r.name.as_deref())
                    .map(|name| TimestampedReference::new(name, TimestampedObjectKind::DataObject))
                    .collect();
            }

            let mut references = Vec::new();
            if coordinate.starts_chain() {
                add_references(&mut references, data_object_proofs.iter().cloned());
                add_references(
                    &mut references,
                    [TimestampedReference::new(
                        self.record.id.as_str(),
                        TimestampedObjectKind::EvidenceRecord,
                    )],
                );
                add_references(&mut references, previous_chain.drain(..));
            }
            add_references(&mut references, previous_timestamp.drain(..));
            add_references(&mut references, validation_data.iter().cloned());

            let token = &ats.timestamp;
            certificates.extend(token.all_certificates());
            crls.extend(&token.crls);
            ocsps.extend(&token.ocsps);

            let encapsulated = token_references(token);
            add_references(&mut previous_timestamp, encapsulated.iter().cloned());
            add_references(&mut previous_chain, encapsulated);
            add_references(
                &mut validation_data,
                information_references(&ats.cryptographic_information),
            );

            debug!(
                %coordinate,
                valid = validation.is_valid(),
                references = references.len(),
                "archive-timestamp processed"
            );
            timestamps.push(ValidatedTimestamp {
                coordinate,
                token: token.clone(),
                validation,
                timestamped_references: references,
            });
        }

        let elapsed = timer.finish();
        info!(
            timestamps = timestamps.len(),
            valid = timestamps.iter().filter(|t| t.validation.is_valid()).count(),
            elapsed_us = elapsed.as_micros() as u64,
            "evidence record traversal complete"
        );

        Ok(TimestampExtraction {
            timestamps,
            certificates: certificates.into_vec(),
            crls: crls.into_vec(),
            ocsps: ocsps.into_vec(),
            data_object_references,
        })
    }
}

fn add_references(
    target: &mut Vec<TimestampedReference>,
    references: impl IntoIterator<Item = TimestampedReference>,
) {
    for reference in references {
        if !target.contains(&reference) {
            target.push(reference);
        }
    }
}

/// The token itself and the validation data it embeds.
fn token_references(token: &TimestampToken) -> Vec<TimestampedReference> {
    let mut references = vec![TimestampedReference::new(
        token.id.as_str(),
        TimestampedObjectKind::Timestamp,
    )];
    add_references(
        &mut references,
        token
            .all_certificates()
            .map(|c| TimestampedReference::new(c.id.as_str(), TimestampedObjectKind::Certificate)),
    );
    add_references(
        &mut references,
        token
            .crls
            .iter()
            .chain(&token.ocsps)
            .map(|r| TimestampedReference::new(r.id.as_str(), TimestampedObjectKind::Revocation)),
    );
    references
}

fn information_references(info: &CryptographicInformation) -> Vec<TimestampedReference> {
    info.certificates
        .iter()
        .map(|c| TimestampedReference::new(c.id.as_str(), TimestampedObjectKind::Certificate))
        .chain(
            info.crls
                .iter()
                .chain(&info.ocsps)
                .map(|r| TimestampedReference::new(r.id.as_str(), TimestampedObjectKind::Revocation)),
        )
        .collect()
}
