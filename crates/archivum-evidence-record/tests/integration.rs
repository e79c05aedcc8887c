use archivum_common_config::{ConfigLoader, OmittedHashTreePolicy, ValidationPolicy};
use archivum_digest::{DigestAlgorithm, DigestCalculator};
use archivum_evidence_record::testutil::{RecordBuilder, FIRST_GENERATION_TIME, RENEWAL_INTERVAL};
use archivum_evidence_record::{
    ArchiveTimeStampVerifier, EvidenceRecordError, EvidenceRecordReport,
    EvidenceRecordTimestampSource, EvidenceRecordVariant, Finding, ImprintStatus, Linkage,
    LinkageStatus, LinkageStrategy, PoeLedger, TimestampAcceptability, TimestampCoordinate,
    TrustedCertificateSource,
};
use archivum_common_core::Timestamp;
use archivum_test_utils::{assert_err, assert_ok, temp_dir};

fn two_timestamp_record() -> archivum_evidence_record::EvidenceRecord {
    RecordBuilder::new("er-contract")
        .data_object("contract.pdf", b"%PDF-1.7 contract body")
        .chain(DigestAlgorithm::Sha256, 2)
        .shared_root_certificate("C-ROOT")
        .build()
}

#[test]
fn test_end_to_end_two_timestamps_in_one_chain() {
    let record = two_timestamp_record();
    let document_digest = DigestCalculator::compute(DigestAlgorithm::Sha256, b"%PDF-1.7 contract body");
    let first_token = record.chains[0].archive_timestamps[0].timestamp.encoded.clone();

    let source = EvidenceRecordTimestampSource::new(record, ValidationPolicy::default());
    let timestamps = assert_ok!(source.timestamps());

    assert_eq!(timestamps.len(), 2);
    assert_eq!(timestamps[0].validation.root, document_digest);
    assert!(timestamps[0].validation.is_valid());

    let linking = DigestCalculator::compute(DigestAlgorithm::Sha256, &first_token);
    assert_eq!(
        timestamps[1].validation.linking_digest,
        Linkage::ArchiveTimeStamp(linking.clone())
    );
    assert!(source.record().chains[0].archive_timestamps[1].hash_tree[0].contains(linking.value()));
    assert!(timestamps[1].validation.is_valid());
}

#[test]
fn test_removing_link_breaks_only_linkage() {
    let mut record = two_timestamp_record();
    record.chains[0].archive_timestamps[1].hash_tree[0].digest_values.clear();
    record.chains[0].archive_timestamps[1].hash_tree[0]
        .digest_values
        .push(vec![0x5a; 32]);

    let source = EvidenceRecordTimestampSource::new(record, ValidationPolicy::default());
    let second = &assert_ok!(source.timestamps())[1];

    assert_eq!(second.validation.linkage, LinkageStatus::Missing);
    assert!(!second.validation.is_valid());
    // The token's own signature is untouched.
    assert!(second.token.signature_valid);

    let report = assert_ok!(source.report(None));
    assert_eq!(report.timestamps[1].findings, vec![Finding::LinkageMissing]);
}

#[test]
fn test_two_chains_asn1_and_xml() {
    for variant in [EvidenceRecordVariant::Asn1, EvidenceRecordVariant::Xml] {
        let record = RecordBuilder::new("er-renewed")
            .variant(variant)
            .data_object("contract.pdf", b"contract")
            .chain(DigestAlgorithm::Sha256, 2)
            .chain(DigestAlgorithm::Sha512, 2)
            .build();
        let expected = LinkageStrategy::for_variant(variant).preceding_chains_digest(
            DigestAlgorithm::Sha512,
            &record,
            1,
        );

        let source = EvidenceRecordTimestampSource::new(record, ValidationPolicy::default());
        let report = assert_ok!(source.report(None));
        assert!(report.is_valid(), "{variant} record should validate: {report:?}");

        let renewal = assert_ok!(source.extract())
            .timestamp(TimestampCoordinate::new(1, 0))
            .cloned()
            .unwrap();
        assert_eq!(
            renewal.validation.linking_digest,
            Linkage::ArchiveTimeStampSequence(expected)
        );
    }
}

#[test]
fn test_record_built_for_one_variant_fails_as_the_other() {
    let mut record = RecordBuilder::new("er-xml")
        .variant(EvidenceRecordVariant::Xml)
        .data_object("contract.pdf", b"contract")
        .chain(DigestAlgorithm::Sha256, 2)
        .build();
    record.variant = EvidenceRecordVariant::Asn1;

    let verifier = ArchiveTimeStampVerifier::new(&record, OmittedHashTreePolicy::SingleObject);
    let validation = assert_ok!(verifier.verify(TimestampCoordinate::new(0, 1)));

    assert_eq!(validation.linkage, LinkageStatus::Missing);
}

#[test]
fn test_omitted_hash_tree_policy_from_config_file() {
    let dir = temp_dir();
    let config_dir = dir.path().join(".archivum");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.yaml"),
        "validation:\n  omitted_hash_tree: reject\n",
    )
    .unwrap();
    let policy = assert_ok!(ConfigLoader::new(dir.path()).load()).validation;

    let record = RecordBuilder::new("er-single")
        .data_object("contract.pdf", b"contract")
        .chain(DigestAlgorithm::Sha256, 1)
        .omit_hash_tree(0, 0)
        .build();

    let lenient = EvidenceRecordTimestampSource::new(record.clone(), ValidationPolicy::default());
    assert!(assert_ok!(lenient.timestamps())[0].validation.is_valid());

    let strict = EvidenceRecordTimestampSource::new(record, policy);
    let first = &assert_ok!(strict.timestamps())[0];
    assert_eq!(first.validation.imprint, ImprintStatus::HashTreeMissing);
}

#[test]
fn test_reject_policy_fails_traversal_when_link_needs_tree() {
    let record = RecordBuilder::new("er-single")
        .data_object("contract.pdf", b"contract")
        .chain(DigestAlgorithm::Sha256, 2)
        .omit_hash_tree(0, 1)
        .build();
    let policy = ValidationPolicy {
        omitted_hash_tree: OmittedHashTreePolicy::Reject,
        ..ValidationPolicy::default()
    };

    let source = EvidenceRecordTimestampSource::new(record, policy);

    assert_err!(
        source.extract(),
        EvidenceRecordError::EmptyHashTree { chain: 0, timestamp: 1 }
    );
    assert!(!source.is_extracted());
}

#[test]
fn test_poe_from_accepted_timestamps() {
    let record = two_timestamp_record();
    let source = EvidenceRecordTimestampSource::new(record, ValidationPolicy::default());
    let extraction = assert_ok!(source.extract());
    let acceptability = TimestampAcceptability::new(TrustedCertificateSource::new(["C-ROOT"]), false);

    let control = Timestamp::from_unix_seconds(FIRST_GENERATION_TIME + 100 * RENEWAL_INTERVAL).unwrap();
    let mut ledger = PoeLedger::with_control_time(control);
    assert_eq!(ledger.extract_acceptable(extraction, &acceptability), 2);

    let first_time = Timestamp::from_unix_seconds(FIRST_GENERATION_TIME).unwrap();
    let second_time = Timestamp::from_unix_seconds(FIRST_GENERATION_TIME + RENEWAL_INTERVAL).unwrap();
    assert_eq!(ledger.lowest_poe("contract.pdf"), first_time);
    assert_eq!(ledger.lowest_poe("er-contract"), first_time);
    assert_eq!(ledger.lowest_poe("T-0-0"), second_time);
    assert_eq!(ledger.lowest_poe("C-TSA-0-0"), second_time);
    assert_eq!(ledger.lowest_poe("T-0-1"), control);
    assert_eq!(ledger.poe_map().len(), 5);
}

#[test]
fn test_untrusted_timestamps_give_no_poe() {
    let source = EvidenceRecordTimestampSource::new(two_timestamp_record(), ValidationPolicy::default());
    let acceptability = TimestampAcceptability::from_policy(source.policy());

    let mut ledger = PoeLedger::new();
    assert_eq!(ledger.extract_acceptable(assert_ok!(source.extract()), &acceptability), 0);
    assert!(ledger.poe_map().is_empty());

    let report = assert_ok!(source.report(Some(&acceptability)));
    assert_eq!(
        report.with_finding(Finding::NotAcceptable),
        vec![TimestampCoordinate::new(0, 0), TimestampCoordinate::new(0, 1)]
    );
}

#[test]
fn test_repeated_extraction_returns_same_list() {
    let source = EvidenceRecordTimestampSource::new(two_timestamp_record(), ValidationPolicy::default());

    let first: Vec<_> = assert_ok!(source.timestamps()).to_vec();
    let second: Vec<_> = assert_ok!(source.timestamps()).to_vec();

    assert_eq!(first, second);
}

#[test]
fn test_report_roundtrips_through_json() {
    let source = EvidenceRecordTimestampSource::new(two_timestamp_record(), ValidationPolicy::default());
    let report = assert_ok!(source.report(None));

    let json = serde_json::to_string_pretty(&report).unwrap();
    let back: EvidenceRecordReport = serde_json::from_str(&json).unwrap();

    assert_eq!(back, report);
}
