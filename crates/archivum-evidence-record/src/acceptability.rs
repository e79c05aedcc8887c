//! Acceptability of individual time-stamps.

use crate::timestamp_source::ValidatedTimestamp;
use crate::token::CertificateToken;
use archivum_common_config::ValidationPolicy;
use std::collections::HashSet;
use tracing::debug;

/// Ids of the certificates accepted as trust anchors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedCertificateSource {
    ids: HashSet<String>,
}

impl TrustedCertificateSource {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    pub fn is_trusted(&self, certificate: &CertificateToken) -> bool {
        self.ids.contains(&certificate.id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Decides whether a validated time-stamp may be relied upon.
#[derive(Debug, Clone)]
pub struct TimestampAcceptability {
    trusted: TrustedCertificateSource,
    accept_untrusted_chains: bool,
}

impl TimestampAcceptability {
    pub fn new(trusted: TrustedCertificateSource, accept_untrusted_chains: bool) -> Self {
        Self {
            trusted,
            accept_untrusted_chains,
        }
    }

    pub fn from_policy(policy: &ValidationPolicy) -> Self {
        Self::new(
            TrustedCertificateSource::new(policy.trusted_certificates.iter().cloned()),
            policy.accept_untrusted_chains,
        )
    }

    /// Imprint intact, signature valid, and the chain reaches a trust anchor
    /// unless untrusted chains are accepted.
    pub fn is_acceptable(
        &self,
        timestamp: &ValidatedTimestamp,
        candidate_chain: &[&CertificateToken],
    ) -> bool {
        let imprint_intact = timestamp.validation.imprint.is_intact();
        let signature_valid = timestamp.token.signature_valid;
        let trusted = candidate_chain.iter().any(|c| self.trusted.is_trusted(c));

        let acceptable =
            imprint_intact && signature_valid && (trusted || self.accept_untrusted_chains);
        debug!(
            coordinate = %timestamp.coordinate,
            imprint_intact,
            signature_valid,
            trusted,
            acceptable,
            "time-stamp acceptability"
        );
        acceptable
    }

    /// [`Self::is_acceptable`] against the token's own candidate chain.
    pub fn accepts(&self, timestamp: &ValidatedTimestamp) -> bool {
        self.is_acceptable(timestamp, &timestamp.token.candidate_chain())
    }
}
