//! Time-stamp tokens and the validation data they embed.
//!
//! Signature verification of a token happens outside this crate; the result
//! is handed in through [`TimestampToken::signature_valid`].

use archivum_common_core::Timestamp;
use archivum_digest::MessageDigest;
use serde::{Deserialize, Serialize};
use strum::Display;

/// An X.509 certificate, identified by a stable id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CertificateToken {
    pub id: String,
    pub subject: String,
    #[serde(default)]
    pub encoded: Vec<u8>,
}

impl CertificateToken {
    pub fn new(id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            encoded: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevocationKind {
    #[strum(serialize = "crl")]
    Crl,
    #[strum(serialize = "ocsp")]
    Ocsp,
}

/// Raw CRL or OCSP response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevocationBinary {
    pub id: String,
    pub kind: RevocationKind,
    #[serde(default)]
    pub encoded: Vec<u8>,
}

impl RevocationBinary {
    pub fn crl(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: RevocationKind::Crl,
            encoded: Vec::new(),
        }
    }

    pub fn ocsp(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: RevocationKind::Ocsp,
            encoded: Vec::new(),
        }
    }
}

/// An RFC 3161 time-stamp token as seen by the chain verifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampToken {
    pub id: String,
    pub generation_time: Timestamp,
    /// Digest the TSA claims to have time-stamped.
    pub message_imprint: MessageDigest,
    /// DER encoding of the token's ContentInfo.
    pub encoded: Vec<u8>,
    pub signer_certificate: Option<CertificateToken>,
    #[serde(default)]
    pub certificates: Vec<CertificateToken>,
    #[serde(default)]
    pub crls: Vec<RevocationBinary>,
    #[serde(default)]
    pub ocsps: Vec<RevocationBinary>,
    /// Outcome of the external CMS signature check.
    pub signature_valid: bool,
}

impl TimestampToken {
    /// Signer certificate followed by every other embedded certificate.
    pub fn candidate_chain(&self) -> Vec<&CertificateToken> {
        self.signer_certificate
            .iter()
            .chain(
                self.certificates
                    .iter()
                    .filter(|c| Some(&c.id) != self.signer_certificate.as_ref().map(|s| &s.id)),
            )
            .collect()
    }

    /// Every certificate the token carries, signer included.
    pub fn all_certificates(&self) -> impl Iterator<Item = &CertificateToken> {
        self.signer_certificate.iter().chain(self.certificates.iter())
    }
}
