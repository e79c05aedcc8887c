//! Supported digest algorithms.

use crate::error::{DigestError, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// A hash algorithm an archive-timestamp chain may be bound to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DigestAlgorithm {
    #[strum(serialize = "SHA224")]
    Sha224,
    #[strum(serialize = "SHA256")]
    Sha256,
    #[strum(serialize = "SHA384")]
    Sha384,
    #[strum(serialize = "SHA512")]
    Sha512,
}

impl DigestAlgorithm {
    /// Length in bytes of a digest produced by this algorithm.
    pub fn output_len(self) -> usize {
        match self {
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Dotted OID used in ASN.1 evidence records (RFC 4998).
    pub fn oid(self) -> &'static str {
        match self {
            Self::Sha224 => "2.16.840.1.101.3.4.2.4",
            Self::Sha256 => "2.16.840.1.101.3.4.2.1",
            Self::Sha384 => "2.16.840.1.101.3.4.2.2",
            Self::Sha512 => "2.16.840.1.101.3.4.2.3",
        }
    }

    /// Algorithm URI used in XML evidence records (RFC 6283).
    pub fn xml_uri(self) -> &'static str {
        match self {
            Self::Sha224 => "http://www.w3.org/2001/04/xmldsig-more#sha224",
            Self::Sha256 => "http://www.w3.org/2001/04/xmlenc#sha256",
            Self::Sha384 => "http://www.w3.org/2001/04/xmldsig-more#sha384",
            Self::Sha512 => "http://www.w3.org/2001/04/xmlenc#sha512",
        }
    }

    /// Resolve an algorithm from its name (`SHA256`, `SHA-256`), OID or XML URI.
    pub fn parse(value: &str) -> Result<Self> {
        let normalized = value.trim().to_uppercase().replace('-', "");
        Self::iter()
            .find(|alg| {
                alg.to_string() == normalized || alg.oid() == value.trim() || alg.xml_uri() == value.trim()
            })
            .ok_or_else(|| DigestError::UnsupportedAlgorithm(value.to_string()))
    }
}

impl std::str::FromStr for DigestAlgorithm {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_name() {
        assert_eq!(DigestAlgorithm::parse("SHA256").unwrap(), DigestAlgorithm::Sha256);
        assert_eq!(DigestAlgorithm::parse("sha-512").unwrap(), DigestAlgorithm::Sha512);
    }

    #[test]
    fn test_parse_by_oid_and_uri() {
        assert_eq!(
            DigestAlgorithm::parse("2.16.840.1.101.3.4.2.2").unwrap(),
            DigestAlgorithm::Sha384
        );
        assert_eq!(
            DigestAlgorithm::parse("http://www.w3.org/2001/04/xmlenc#sha256").unwrap(),
            DigestAlgorithm::Sha256
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            DigestAlgorithm::parse("MD5"),
            Err(DigestError::UnsupportedAlgorithm("MD5".to_string()))
        );
    }

    #[test]
    fn test_display_and_serde_names() {
        assert_eq!(DigestAlgorithm::Sha224.to_string(), "SHA224");
        let json = serde_json::to_string(&DigestAlgorithm::Sha384).unwrap();
        assert_eq!(json, "\"SHA384\"");
    }
}
