//! Configuration types.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchivumConfig {
    /// Evidence record validation policy.
    pub validation: ValidationPolicy,
}

/// Policy applied to one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Accept time-stamps whose signer chain does not reach a trust anchor.
    pub accept_untrusted_chains: bool,
    /// What to do when an archive-timestamp carries no hash tree.
    pub omitted_hash_tree: OmittedHashTreePolicy,
    /// Identifiers of certificates treated as trust anchors.
    #[serde(default)]
    pub trusted_certificates: Vec<String>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            accept_untrusted_chains: false,
            omitted_hash_tree: OmittedHashTreePolicy::SingleObject,
            trusted_certificates: Vec::new(),
        }
    }
}

/// Handling of an archive-timestamp whose hash tree was omitted.
///
/// A hash tree may be left out when a time-stamp covers exactly one object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OmittedHashTreePolicy {
    /// Treat the single covered object's digest as a one-value first group.
    #[default]
    SingleObject,
    /// Refuse to compute a root; the time-stamp is reported as missing its tree.
    Reject,
}

impl FromStr for OmittedHashTreePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "single_object" => Ok(Self::SingleObject),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown omitted hash tree policy '{other}'")),
        }
    }
}
