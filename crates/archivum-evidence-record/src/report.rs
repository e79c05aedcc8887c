//! Serializable summary of an evidence record validation.

use crate::acceptability::TimestampAcceptability;
use crate::linkage::LinkageStatus;
use crate::model::TimestampCoordinate;
use crate::reference::{ReferenceKind, ReferenceValidation};
use crate::timestamp_source::{
    EvidenceRecordTimestampSource, TimestampExtraction, ValidatedTimestamp,
};
use crate::verifier::ImprintStatus;
use archivum_common_core::Timestamp;
use serde::{Deserialize, Serialize};
use strum::Display;

/// A single failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Finding {
    LinkageMissing,
    ImprintNotIntact,
    ImprintNotFound,
    OrphanReference,
    DataObjectNotIntact,
    SignatureInvalid,
    NotAcceptable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimestampStatus {
    Valid,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampReport {
    pub chain: usize,
    pub timestamp: usize,
    pub token_id: String,
    pub generation_time: Timestamp,
    pub status: TimestampStatus,
    pub findings: Vec<Finding>,
}

/// Per-record report listing which time-stamp failed which check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecordReport {
    pub record_id: String,
    pub timestamps: Vec<TimestampReport>,
    pub data_objects: Vec<ReferenceValidation>,
}

impl EvidenceRecordReport {
    /// Build the report. Without `acceptability` only structural checks and
    /// the token signature are reported.
    pub fn new(
        record_id: impl Into<String>,
        extraction: &TimestampExtraction,
        acceptability: Option<&TimestampAcceptability>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            timestamps: extraction
                .timestamps
                .iter()
                .map(|t| timestamp_report(t, acceptability))
                .collect(),
            data_objects: extraction.data_object_references.clone(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.timestamps.iter().all(|t| t.status == TimestampStatus::Valid)
    }

    pub fn timestamp(&self, coordinate: TimestampCoordinate) -> Option<&TimestampReport> {
        self.timestamps
            .iter()
            .find(|t| t.chain == coordinate.chain && t.timestamp == coordinate.timestamp)
    }

    /// Coordinates of the time-stamps reporting `finding`.
    pub fn with_finding(&self, finding: Finding) -> Vec<TimestampCoordinate> {
        self.timestamps
            .iter()
            .filter(|t| t.findings.contains(&finding))
            .map(|t| TimestampCoordinate::new(t.chain, t.timestamp))
            .collect()
    }
}

impl EvidenceRecordTimestampSource {
    /// Traverse the record (if not done yet) and summarise the outcome.
    pub fn report(
        &self,
        acceptability: Option<&TimestampAcceptability>,
    ) -> crate::error::Result<EvidenceRecordReport> {
        Ok(EvidenceRecordReport::new(
            self.record().id.as_str(),
            self.extract()?,
            acceptability,
        ))
    }
}

fn timestamp_report(
    timestamp: &ValidatedTimestamp,
    acceptability: Option<&TimestampAcceptability>,
) -> TimestampReport {
    let validation = &timestamp.validation;
    let mut findings = Vec::new();

    if validation.linkage == LinkageStatus::Missing {
        findings.push(Finding::LinkageMissing);
    }
    match validation.imprint {
        ImprintStatus::Mismatch { .. } => findings.push(Finding::ImprintNotIntact),
        ImprintStatus::HashTreeMissing => findings.push(Finding::ImprintNotFound),
        ImprintStatus::Intact | ImprintStatus::NotChecked => {}
    }
    if validation
        .references
        .iter()
        .any(|r| r.kind == ReferenceKind::OrphanReference)
    {
        findings.push(Finding::OrphanReference);
    }
    if validation
        .references
        .iter()
        .any(|r| r.kind == ReferenceKind::ArchiveDataObject && r.found && !r.intact)
    {
        findings.push(Finding::DataObjectNotIntact);
    }
    if !timestamp.token.signature_valid {
        findings.push(Finding::SignatureInvalid);
    }
    if let Some(checker) = acceptability {
        if timestamp.token.signature_valid && validation.is_valid() && !checker.accepts(timestamp) {
            findings.push(Finding::NotAcceptable);
        }
    }

    let status = if findings.is_empty() {
        TimestampStatus::Valid
    } else {
        TimestampStatus::Invalid
    };

    TimestampReport {
        chain: timestamp.coordinate.chain,
        timestamp: timestamp.coordinate.timestamp,
        token_id: timestamp.token.id.clone(),
        generation_time: timestamp.token.generation_time,
        status,
        findings,
    }
}
