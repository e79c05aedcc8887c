//! Environment variable handling.

use crate::types::{OmittedHashTreePolicy, ValidationPolicy};
use std::env;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("required environment variable not set: {var}")]
    NotSet { var: String },

    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Environment variable names.
pub mod vars {
    // Configuration
    pub const ARCHIVUM_CONFIG_DIR: &str = "ARCHIVUM_CONFIG_DIR";

    // Validation policy overrides
    pub const ARCHIVUM_ACCEPT_UNTRUSTED_CHAINS: &str = "ARCHIVUM_ACCEPT_UNTRUSTED_CHAINS";
    pub const ARCHIVUM_OMITTED_HASH_TREE: &str = "ARCHIVUM_OMITTED_HASH_TREE";
}

/// Environment access helpers.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Load `.env` and `.env.local` from the working directory, if present.
    pub fn init() -> Self {
        let _ = dotenvy::from_filename(".env");
        let _ = dotenvy::from_filename(".env.local");
        Self { _guard: () }
    }

    /// Get a required string variable.
    pub fn require(var: &str) -> Result<String, EnvError> {
        env::var(var).map_err(|_| EnvError::NotSet { var: var.to_string() })
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok()
    }

    /// Get a boolean variable.
    pub fn get_bool(var: &str) -> Option<bool> {
        env::var(var)
            .ok()
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
    }
}

impl ValidationPolicy {
    /// Apply `ARCHIVUM_*` overrides on top of a loaded policy.
    pub fn apply_env_overrides(mut self) -> Result<Self, EnvError> {
        if let Some(accept) = Environment::get_bool(vars::ARCHIVUM_ACCEPT_UNTRUSTED_CHAINS) {
            self.accept_untrusted_chains = accept;
        }

        if let Some(raw) = Environment::get(vars::ARCHIVUM_OMITTED_HASH_TREE) {
            self.omitted_hash_tree = raw.parse::<OmittedHashTreePolicy>().map_err(|message| {
                EnvError::InvalidValue {
                    var: vars::ARCHIVUM_OMITTED_HASH_TREE.to_string(),
                    message,
                }
            })?;
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_parsing() {
        env::set_var("ARCHIVUM_TEST_BOOL", "true");
        assert_eq!(Environment::get_bool("ARCHIVUM_TEST_BOOL"), Some(true));
        env::set_var("ARCHIVUM_TEST_BOOL", "1");
        assert_eq!(Environment::get_bool("ARCHIVUM_TEST_BOOL"), Some(true));
        env::set_var("ARCHIVUM_TEST_BOOL", "false");
        assert_eq!(Environment::get_bool("ARCHIVUM_TEST_BOOL"), Some(false));
        env::remove_var("ARCHIVUM_TEST_BOOL");
        assert_eq!(Environment::get_bool("ARCHIVUM_TEST_BOOL"), None);
    }

    #[test]
    fn test_require_missing_variable() {
        match Environment::require("ARCHIVUM_SURELY_UNSET_12345") {
            Err(EnvError::NotSet { var }) => assert_eq!(var, "ARCHIVUM_SURELY_UNSET_12345"),
            other => panic!("Expected NotSet, got {:?}", other),
        }
    }

    // Both override variables are exercised in one test to avoid env races.
    #[test]
    fn test_policy_env_overrides() {
        env::set_var(vars::ARCHIVUM_ACCEPT_UNTRUSTED_CHAINS, "yes");
        env::set_var(vars::ARCHIVUM_OMITTED_HASH_TREE, "reject");

        let policy = ValidationPolicy::default().apply_env_overrides().unwrap();
        assert!(policy.accept_untrusted_chains);
        assert_eq!(policy.omitted_hash_tree, OmittedHashTreePolicy::Reject);

        env::set_var(vars::ARCHIVUM_OMITTED_HASH_TREE, "whatever");
        let result = ValidationPolicy::default().apply_env_overrides();
        assert!(matches!(result, Err(EnvError::InvalidValue { .. })));

        env::remove_var(vars::ARCHIVUM_ACCEPT_UNTRUSTED_CHAINS);
        env::remove_var(vars::ARCHIVUM_OMITTED_HASH_TREE);

        let policy = ValidationPolicy::default().apply_env_overrides().unwrap();
        assert_eq!(policy, ValidationPolicy::default());
    }

    #[test]
    fn test_environment_init_without_files() {
        let _env = Environment::init();
    }
}
