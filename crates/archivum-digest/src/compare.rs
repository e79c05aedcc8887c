//! Byte-array ordering used by the hash-tree fold.

use std::cmp::Ordering;

/// Strict unsigned, byte-wise lexicographic comparison.
///
/// Bytes are compared as values in `0..=255`; when one array is a prefix of
/// the other the shorter one sorts first. This is the slice ordering of `u8`.
pub fn compare_unsigned(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

/// Sort byte arrays in ascending unsigned order.
pub fn sort_unsigned(values: &mut [Vec<u8>]) {
    values.sort_by(|a, b| compare_unsigned(a, b));
}
