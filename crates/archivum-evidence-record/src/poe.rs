//! Proof-of-existence ledger.

use crate::acceptability::TimestampAcceptability;
use crate::timestamp_source::{TimestampExtraction, ValidatedTimestamp};
use archivum_common_core::Timestamp;
use std::collections::HashMap;
use tracing::trace;

/// Earliest proven existence time per object id.
///
/// Times only ever move earlier. Objects without an entry are treated as
/// proven at the control time, i.e. not proven in the past at all.
#[derive(Debug, Clone)]
pub struct PoeLedger {
    control_time: Timestamp,
    poe: HashMap<String, Timestamp>,
}

impl PoeLedger {
    /// Ledger whose control time is now.
    pub fn new() -> Self {
        Self::with_control_time(Timestamp::now())
    }

    pub fn with_control_time(control_time: Timestamp) -> Self {
        Self {
            control_time,
            poe: HashMap::new(),
        }
    }

    pub fn control_time(&self) -> Timestamp {
        self.control_time
    }

    /// Record `time` for `id`, keeping the earlier of the old and new times.
    pub fn add_poe(&mut self, id: impl Into<String>, time: Timestamp) {
        self.poe
            .entry(id.into())
            .and_modify(|existing| *existing = existing.earliest(time))
            .or_insert(time);
    }

    /// Register the generation time of `timestamp` for every object it covers.
    pub fn extract_poe(&mut self, timestamp: &ValidatedTimestamp) {
        let time = timestamp.token.generation_time;
        for reference in &timestamp.timestamped_references {
            trace!(id = %reference.id, %time, "proof of existence");
            self.add_poe(reference.id.as_str(), time);
        }
    }

    /// Register every time-stamp of `extraction` that `acceptability` accepts.
    ///
    /// Returns how many time-stamps contributed.
    pub fn extract_acceptable(
        &mut self,
        extraction: &TimestampExtraction,
        acceptability: &TimestampAcceptability,
    ) -> usize {
        let mut accepted = 0;
        for timestamp in extraction
            .timestamps
            .iter()
            .filter(|t| acceptability.accepts(t))
        {
            self.extract_poe(timestamp);
            accepted += 1;
        }
        accepted
    }

    /// Earliest proof for `id`, or the control time when there is none.
    pub fn lowest_poe(&self, id: &str) -> Timestamp {
        self.poe.get(id).copied().unwrap_or(self.control_time)
    }

    pub fn has_poe(&self, id: &str) -> bool {
        self.poe.contains_key(id)
    }

    pub fn poe_map(&self) -> &HashMap<String, Timestamp> {
        &self.poe
    }
}

impl Default for PoeLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acceptability::TrustedCertificateSource;
    use crate::testutil::RecordBuilder;
    use crate::timestamp_source::EvidenceRecordTimestampSource;
    use archivum_common_config::ValidationPolicy;
    use archivum_digest::DigestAlgorithm;
    use proptest::prelude::*;

    fn at(seconds: i64) -> Timestamp {
        Timestamp::from_unix_seconds(seconds).unwrap()
    }

    #[test]
    fn test_keeps_minimum_time() {
        let mut ledger = PoeLedger::with_control_time(at(10_000));
        ledger.add_poe("doc", at(200));
        ledger.add_poe("doc", at(100));
        ledger.add_poe("doc", at(300));

        assert_eq!(ledger.lowest_poe("doc"), at(100));
    }

    #[test]
    fn test_unknown_id_falls_back_to_control_time() {
        let ledger = PoeLedger::with_control_time(at(10_000));
        assert_eq!(ledger.lowest_poe("missing"), at(10_000));
        assert!(!ledger.has_poe("missing"));
    }

    #[test]
    fn test_extract_acceptable_skips_rejected_timestamps() {
        let mut record = RecordBuilder::new("er-1")
            .data_object("doc.txt", b"the document")
            .chain(DigestAlgorithm::Sha256, 2)
            .build();
        record.chains[0].archive_timestamps[0].timestamp.signature_valid = false;
        let source = EvidenceRecordTimestampSource::new(record, ValidationPolicy::default());
        let extraction = source.extract().unwrap();
        let acceptability = TimestampAcceptability::new(TrustedCertificateSource::default(), true);

        let mut ledger = PoeLedger::with_control_time(at(i64::from(u32::MAX)));
        let accepted = ledger.extract_acceptable(extraction, &acceptability);

        assert_eq!(accepted, 1);
        assert!(!ledger.has_poe("doc.txt"));
        assert!(ledger.has_poe("T-0-0"));
        assert_eq!(
            ledger.lowest_poe("T-0-0"),
            extraction.timestamps[1].token.generation_time
        );
    }

    proptest! {
        #[test]
        fn test_lowest_poe_is_minimum_of_all_proofs(
            times in prop::collection::vec(0i64..4_000_000_000, 1..20),
        ) {
            let mut ledger = PoeLedger::with_control_time(at(5_000_000_000));
            for t in &times {
                ledger.add_poe("object", at(*t));
            }
            let min = times.iter().copied().min().unwrap();
            prop_assert_eq!(ledger.lowest_poe("object"), at(min));
        }
    }
}
