//! Builders for well-formed evidence records with real digests.
//!
//! Every archive-timestamp the builder produces links correctly to its
//! predecessor and carries a message imprint equal to its folded hash tree,
//! so tests start from a valid record and break exactly what they target.

use crate::hash_tree::fold_hash_tree;
use crate::linkage::{der_length, LinkageStrategy};
use crate::model::{
    ArchiveTimeStamp, ArchiveTimeStampChain, CryptographicInformation, DataObject,
    DigestValueGroup, EvidenceRecord, EvidenceRecordVariant,
};
use crate::token::{CertificateToken, TimestampToken};
use archivum_common_core::Timestamp;
use archivum_digest::{DigestAlgorithm, MessageDigest};
use std::collections::{HashMap, HashSet};

/// Generation time of the record's first time-stamp.
pub const FIRST_GENERATION_TIME: i64 = 1_600_000_000;

/// Seconds between consecutive time-stamps built by [`RecordBuilder`].
pub const RENEWAL_INTERVAL: i64 = 86_400;

/// Fluent builder for [`EvidenceRecord`]s.
///
/// Token ids follow `T-{chain}-{timestamp}` and signer certificate ids
/// `C-TSA-{chain}-{timestamp}`.
pub struct RecordBuilder {
    id: String,
    variant: EvidenceRecordVariant,
    data_objects: Vec<DataObject>,
    chains: Vec<(DigestAlgorithm, usize)>,
    omitted: HashSet<(usize, usize)>,
    information: HashMap<(usize, usize), CryptographicInformation>,
    shared_certificates: Vec<CertificateToken>,
    record_information: CryptographicInformation,
}

impl RecordBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            variant: EvidenceRecordVariant::Asn1,
            data_objects: Vec::new(),
            chains: Vec::new(),
            omitted: HashSet::new(),
            information: HashMap::new(),
            shared_certificates: Vec::new(),
            record_information: CryptographicInformation::default(),
        }
    }

    pub fn variant(mut self, variant: EvidenceRecordVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn data_object(mut self, name: &str, content: &[u8]) -> Self {
        self.data_objects.push(DataObject::new(name, content));
        self
    }

    /// Append a chain of `timestamps` archive-timestamps.
    pub fn chain(mut self, algorithm: DigestAlgorithm, timestamps: usize) -> Self {
        self.chains.push((algorithm, timestamps));
        self
    }

    /// Drop the hash tree of one archive-timestamp after computing its imprint.
    pub fn omit_hash_tree(mut self, chain: usize, timestamp: usize) -> Self {
        self.omitted.insert((chain, timestamp));
        self
    }

    pub fn with_cryptographic_information(
        mut self,
        chain: usize,
        timestamp: usize,
        information: CryptographicInformation,
    ) -> Self {
        self.information.insert((chain, timestamp), information);
        self
    }

    /// Embed the same root certificate in every token.
    pub fn shared_root_certificate(mut self, id: &str) -> Self {
        self.shared_certificates
            .push(CertificateToken::new(id, format!("CN={id}")));
        self
    }

    pub fn record_certificate(mut self, certificate: CertificateToken) -> Self {
        self.record_information.certificates.push(certificate);
        self
    }

    pub fn build(self) -> EvidenceRecord {
        let strategy = LinkageStrategy::for_variant(self.variant);
        let mut record = EvidenceRecord {
            id: self.id.clone(),
            variant: self.variant,
            chains: Vec::new(),
            detached_contents: self.data_objects.clone(),
            cryptographic_information: self.record_information.clone(),
        };

        let mut sequence = 0;
        for (c, (algorithm, count)) in self.chains.iter().copied().enumerate() {
            let mut archive_timestamps: Vec<ArchiveTimeStamp> = Vec::with_capacity(count);

            for t in 0..count {
                let group = match archive_timestamps.last() {
                    Some(previous) => {
                        vec![strategy
                            .archive_timestamp_digest(algorithm, previous)
                            .into_value()]
                    }
                    None => {
                        let mut values: Vec<Vec<u8>> = self
                            .data_objects
                            .iter()
                            .map(|o| o.digest(algorithm).into_value())
                            .collect();
                        if c > 0 {
                            values.push(
                                strategy
                                    .preceding_chains_digest(algorithm, &record, c)
                                    .into_value(),
                            );
                        }
                        values
                    }
                };
                let hash_tree = vec![DigestValueGroup::new(group)];
                let imprint = fold_hash_tree(algorithm, &hash_tree, MessageDigest::empty());

                let token = self.token(c, t, sequence, imprint);
                let encoded = xml_element("ArchiveTimeStamp", &token.id, &token.encoded);
                archive_timestamps.push(ArchiveTimeStamp {
                    hash_tree: if self.omitted.contains(&(c, t)) {
                        Vec::new()
                    } else {
                        hash_tree
                    },
                    timestamp: token,
                    encoded,
                    cryptographic_information: self
                        .information
                        .get(&(c, t))
                        .cloned()
                        .unwrap_or_default(),
                });
                sequence += 1;
            }

            let encoded = chain_encoding(self.variant, c, &archive_timestamps);
            record.chains.push(ArchiveTimeStampChain {
                digest_algorithm: algorithm,
                archive_timestamps,
                encoded,
            });
        }

        record
    }

    fn token(&self, chain: usize, timestamp: usize, sequence: i64, imprint: MessageDigest) -> TimestampToken {
        let id = format!("T-{chain}-{timestamp}");
        let generation_time =
            Timestamp::from_unix_seconds(FIRST_GENERATION_TIME + sequence * RENEWAL_INTERVAL)
                .expect("generation time in range");

        let mut content = id.clone().into_bytes();
        content.extend_from_slice(imprint.value());

        TimestampToken {
            encoded: der_sequence(&content),
            signer_certificate: Some(CertificateToken::new(
                format!("C-TSA-{chain}-{timestamp}"),
                format!("CN=TSA {chain}/{timestamp}"),
            )),
            certificates: self.shared_certificates.clone(),
            crls: Vec::new(),
            ocsps: Vec::new(),
            signature_valid: true,
            message_imprint: imprint,
            generation_time,
            id,
        }
    }
}

fn der_sequence(content: &[u8]) -> Vec<u8> {
    let mut out = vec![0x30];
    out.extend(der_length(content.len()));
    out.extend_from_slice(content);
    out
}

fn xml_element(name: &str, id: &str, body: &[u8]) -> Vec<u8> {
    let mut out = format!("<{name} Id=\"{id}\">").into_bytes();
    out.extend_from_slice(body);
    out.extend_from_slice(format!("</{name}>").as_bytes());
    out
}

fn chain_encoding(
    variant: EvidenceRecordVariant,
    chain: usize,
    archive_timestamps: &[ArchiveTimeStamp],
) -> Vec<u8> {
    match variant {
        EvidenceRecordVariant::Asn1 => {
            let content: Vec<u8> = archive_timestamps
                .iter()
                .flat_map(|a| a.timestamp.encoded.iter().copied())
                .collect();
            der_sequence(&content)
        }
        EvidenceRecordVariant::Xml => {
            let content: Vec<u8> = archive_timestamps
                .iter()
                .flat_map(|a| a.encoded.iter().copied())
                .collect();
            xml_element("ArchiveTimeStampChain", &chain.to_string(), &content)
        }
    }
}
