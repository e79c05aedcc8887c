//! Configuration types for Archivum.
//!
//! This crate provides the validation policy read from
//! `.archivum/config.yaml` and the environment overrides applied on top.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_sensible_values() {
        let config = ArchivumConfig::default();

        assert!(!config.validation.accept_untrusted_chains);
        assert_eq!(
            config.validation.omitted_hash_tree,
            OmittedHashTreePolicy::SingleObject
        );
        assert!(config.validation.trusted_certificates.is_empty());
    }

    #[test]
    fn test_config_serializes_to_yaml() {
        let config = ArchivumConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();

        assert!(yaml.contains("validation:"));
        assert!(yaml.contains("accept_untrusted_chains: false"));
        assert!(yaml.contains("omitted_hash_tree: single_object"));
    }

    #[test]
    fn test_partial_configs_merge_with_defaults() {
        let partial_yaml = r#"
validation:
  accept_untrusted_chains: true
"#;

        let config: ArchivumConfig = serde_yaml::from_str(partial_yaml).unwrap();

        assert!(config.validation.accept_untrusted_chains);
        assert_eq!(
            config.validation.omitted_hash_tree,
            OmittedHashTreePolicy::SingleObject
        );
    }

    #[test]
    fn test_omitted_hash_tree_policy_parses_snake_case() {
        let policy: OmittedHashTreePolicy = serde_yaml::from_str("reject").unwrap();
        assert_eq!(policy, OmittedHashTreePolicy::Reject);

        let yaml = serde_yaml::to_string(&OmittedHashTreePolicy::SingleObject).unwrap();
        assert!(yaml.contains("single_object"));
    }
}
