//! Configuration file loading and parsing.

use crate::env::{EnvError, Environment};
use crate::types::{ArchivumConfig, ValidationPolicy};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory, relative to the project root, holding `config.yaml`.
pub const CONFIG_DIR: &str = ".archivum";
const CONFIG_FILE: &str = "config.yaml";

static ENV_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env reference pattern is valid")
});

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error(transparent)]
    Env(#[from] EnvError),
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Create a loader rooted at `ARCHIVUM_CONFIG_DIR`, or the working directory.
    pub fn from_env() -> Self {
        match Environment::get(crate::env::vars::ARCHIVUM_CONFIG_DIR) {
            Some(dir) => Self::new(dir),
            None => Self::default(),
        }
    }

    fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load configuration from `.archivum/config.yaml`.
    pub fn load(&self) -> Result<ArchivumConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(ArchivumConfig::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let expanded = self.expand_env_vars(&contents)?;

        let config: ArchivumConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        self.validate(&config)?;
        Ok(config)
    }

    /// Load the validation policy with `ARCHIVUM_*` overrides applied.
    pub fn load_policy(&self) -> Result<ValidationPolicy, ConfigError> {
        let config = self.load()?;
        Ok(config.validation.apply_env_overrides()?)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_REFERENCE.captures_iter(content) {
            let full_match = &cap[0];
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match (Environment::get(var_name), default) {
                (Some(v), _) => v,
                (None, Some(d)) => d.to_string(),
                (None, None) => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            };

            result = result.replace(full_match, &value);
        }

        Ok(result)
    }

    /// Validate configuration values.
    fn validate(&self, config: &ArchivumConfig) -> Result<(), ConfigError> {
        if let Some(blank) = config
            .validation
            .trusted_certificates
            .iter()
            .position(|id| id.trim().is_empty())
        {
            return Err(ConfigError::ValidationError {
                message: format!("validation.trusted_certificates[{blank}] must not be blank"),
            });
        }

        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, config: &ArchivumConfig) -> Result<(), ConfigError> {
        let config_dir = self.base_path.join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir)?;

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(self.config_path(), yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}
