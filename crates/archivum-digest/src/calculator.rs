//! Streaming digest computation.

use crate::algorithm::DigestAlgorithm;
use crate::message_digest::MessageDigest;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

enum Hasher {
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

/// Accumulates bytes and produces a [`MessageDigest`] under one algorithm.
pub struct DigestCalculator {
    algorithm: DigestAlgorithm,
    hasher: Hasher,
}

impl DigestCalculator {
    /// Start a new computation.
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        let hasher = match algorithm {
            DigestAlgorithm::Sha224 => Hasher::Sha224(Sha224::new()),
            DigestAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
            DigestAlgorithm::Sha384 => Hasher::Sha384(Sha384::new()),
            DigestAlgorithm::Sha512 => Hasher::Sha512(Sha512::new()),
        };
        Self { algorithm, hasher }
    }

    /// Algorithm this calculator was created for.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Feed more bytes.
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.hasher {
            Hasher::Sha224(h) => h.update(data),
            Hasher::Sha256(h) => h.update(data),
            Hasher::Sha384(h) => h.update(data),
            Hasher::Sha512(h) => h.update(data),
        }
    }

    /// Finish and return the digest.
    pub fn finalize(self) -> MessageDigest {
        let value = match self.hasher {
            Hasher::Sha224(h) => h.finalize().to_vec(),
            Hasher::Sha256(h) => h.finalize().to_vec(),
            Hasher::Sha384(h) => h.finalize().to_vec(),
            Hasher::Sha512(h) => h.finalize().to_vec(),
        };
        MessageDigest::new(self.algorithm, value)
    }

    /// One-shot digest of `data`.
    pub fn compute(algorithm: DigestAlgorithm, data: &[u8]) -> MessageDigest {
        let mut calculator = Self::new(algorithm);
        calculator.update(data);
        calculator.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sha256_vector() {
        let digest = DigestCalculator::compute(DigestAlgorithm::Sha256, b"abc");
        assert_eq!(
            digest.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let mut calculator = DigestCalculator::new(DigestAlgorithm::Sha512);
        calculator.update(b"hello ");
        calculator.update(b"world");
        assert_eq!(
            calculator.finalize(),
            DigestCalculator::compute(DigestAlgorithm::Sha512, b"hello world")
        );
    }

    #[test]
    fn test_output_lengths() {
        for (alg, len) in [
            (DigestAlgorithm::Sha224, 28),
            (DigestAlgorithm::Sha256, 32),
            (DigestAlgorithm::Sha384, 48),
            (DigestAlgorithm::Sha512, 64),
        ] {
            let digest = DigestCalculator::compute(alg, b"data");
            assert_eq!(digest.value().len(), len);
            assert_eq!(alg.output_len(), len);
            assert_eq!(digest.algorithm(), Some(alg));
        }
    }
}
