//! Reduced hash tree folding.
//!
//! Each group is folded together with the digest produced by the previous
//! group. Values are sorted in unsigned byte order before concatenation, so
//! the order of values inside a group does not matter while the order of
//! the groups does.

use crate::model::DigestValueGroup;
use archivum_digest::{sort_unsigned, DigestAlgorithm, DigestCalculator, MessageDigest};
use tracing::trace;

/// Fold one group into the running digest.
///
/// A working set of exactly one value is passed through unchanged: a lone
/// digest has nothing to be combined with, so no hash is computed.
pub fn fold_group(
    algorithm: DigestAlgorithm,
    group: &DigestValueGroup,
    running: &MessageDigest,
) -> MessageDigest {
    let mut working_set = group.digest_values.clone();
    if !running.is_empty() {
        working_set.push(running.value().to_vec());
    }

    if working_set.len() == 1 {
        return pass_through(algorithm, working_set);
    }

    sort_unsigned(&mut working_set);
    let mut calculator = DigestCalculator::new(algorithm);
    for value in &working_set {
        calculator.update(value);
    }
    let folded = calculator.finalize();
    trace!(members = working_set.len(), digest = %folded, "folded digest value group");
    folded
}

fn pass_through(algorithm: DigestAlgorithm, mut working_set: Vec<Vec<u8>>) -> MessageDigest {
    let value = working_set.pop().unwrap_or_default();
    trace!(len = value.len(), "single-member group passed through");
    MessageDigest::new(algorithm, value)
}

/// Fold a whole hash tree, starting from `seed` (usually empty).
///
/// Returns the root digest; an empty tree yields `seed` unchanged.
pub fn fold_hash_tree(
    algorithm: DigestAlgorithm,
    groups: &[DigestValueGroup],
    seed: MessageDigest,
) -> MessageDigest {
    groups
        .iter()
        .fold(seed, |running, group| fold_group(algorithm, group, &running))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn group(values: &[&[u8]]) -> DigestValueGroup {
        DigestValueGroup::new(values.iter().map(|v| v.to_vec()).collect())
    }

    fn sha256(data: &[u8]) -> Vec<u8> {
        DigestCalculator::compute(DigestAlgorithm::Sha256, data).into_value()
    }

    #[test]
    fn test_single_value_passes_through() {
        let d = sha256(b"document");
        let root = fold_hash_tree(DigestAlgorithm::Sha256, &[group(&[&d])], MessageDigest::empty());
        assert_eq!(root.value(), d.as_slice());
    }

    #[test]
    fn test_two_values_are_sorted_then_hashed() {
        let a = vec![0x80u8; 4];
        let b = vec![0x7fu8; 4];
        let root = fold_hash_tree(
            DigestAlgorithm::Sha256,
            &[group(&[&a, &b])],
            MessageDigest::empty(),
        );

        let mut expected = b.clone();
        expected.extend_from_slice(&a);
        assert_eq!(root.value(), sha256(&expected).as_slice());
    }

    #[test]
    fn test_running_digest_joins_next_group() {
        let a = sha256(b"a");
        let b = sha256(b"b");
        let c = sha256(b"c");

        let root = fold_hash_tree(
            DigestAlgorithm::Sha256,
            &[group(&[&a, &b]), group(&[&c])],
            MessageDigest::empty(),
        );

        let first = fold_group(DigestAlgorithm::Sha256, &group(&[&a, &b]), &MessageDigest::empty());
        let second = fold_group(
            DigestAlgorithm::Sha256,
            &group(&[&c, first.value()]),
            &MessageDigest::empty(),
        );
        assert_eq!(root, second);
    }

    #[test]
    fn test_seed_with_empty_group_passes_through() {
        let seed = MessageDigest::new(DigestAlgorithm::Sha256, sha256(b"seed"));
        let root = fold_group(DigestAlgorithm::Sha256, &DigestValueGroup::default(), &seed);
        assert_eq!(root.value(), seed.value());
    }

    #[test]
    fn test_empty_working_set_hashes_nothing() {
        let root = fold_group(
            DigestAlgorithm::Sha256,
            &DigestValueGroup::default(),
            &MessageDigest::empty(),
        );
        assert_eq!(root.value(), sha256(b"").as_slice());
    }

    #[test]
    fn test_empty_tree_returns_seed() {
        let root = fold_hash_tree(DigestAlgorithm::Sha512, &[], MessageDigest::empty());
        assert!(root.is_empty());
    }

    #[test]
    fn test_group_order_matters() {
        let a = sha256(b"a");
        let b = sha256(b"b");
        let c = sha256(b"c");

        let forward = fold_hash_tree(
            DigestAlgorithm::Sha256,
            &[group(&[&a, &b]), group(&[&c])],
            MessageDigest::empty(),
        );
        let reversed = fold_hash_tree(
            DigestAlgorithm::Sha256,
            &[group(&[&c]), group(&[&a, &b])],
            MessageDigest::empty(),
        );
        assert_ne!(forward, reversed);
    }

    fn algorithm() -> impl Strategy<Value = DigestAlgorithm> {
        prop_oneof![
            Just(DigestAlgorithm::Sha224),
            Just(DigestAlgorithm::Sha256),
            Just(DigestAlgorithm::Sha384),
            Just(DigestAlgorithm::Sha512),
        ]
    }

    proptest! {
        #[test]
        fn test_pass_through_for_any_algorithm(
            alg in algorithm(),
            value in prop::collection::vec(any::<u8>(), 1..80),
        ) {
            let root = fold_hash_tree(alg, &[DigestValueGroup::new(vec![value.clone()])], MessageDigest::empty());
            prop_assert_eq!(root.value(), value.as_slice());
        }

        #[test]
        fn test_permutation_within_group_is_irrelevant(
            values in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..40), 2..8),
            rotation in any::<usize>(),
        ) {
            let mut permuted = values.clone();
            permuted.rotate_left(rotation % values.len());
            permuted.reverse();

            let original = fold_hash_tree(DigestAlgorithm::Sha256, &[DigestValueGroup::new(values)], MessageDigest::empty());
            let shuffled = fold_hash_tree(DigestAlgorithm::Sha256, &[DigestValueGroup::new(permuted)], MessageDigest::empty());
            prop_assert_eq!(original, shuffled);
        }

        #[test]
        fn test_single_byte_tamper_changes_root(
            values in prop::collection::vec(prop::collection::vec(any::<u8>(), 32), 2..6),
            pick in any::<usize>(),
        ) {
            let root = fold_hash_tree(DigestAlgorithm::Sha256, &[DigestValueGroup::new(values.clone())], MessageDigest::empty());

            let mut tampered = values;
            let index = pick % tampered.len();
            tampered[index][0] ^= 0x01;
            let tampered_root = fold_hash_tree(DigestAlgorithm::Sha256, &[DigestValueGroup::new(tampered)], MessageDigest::empty());

            prop_assert_ne!(root, tampered_root);
        }
    }
}
