//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{FolioConfig, StoreBackend};
use std::path::Path;

/// Name of the configuration file within a project directory.
pub const CONFIG_FILE: &str = "folio.toml";

/// Loads and validates a `folio.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<FolioConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `folio.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<FolioConfig, ConfigError> {
    let config: FolioConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &FolioConfig) -> Result<(), ConfigError> {
    if config.cache.app_version.is_empty() {
        return Err(ConfigError::MissingField("cache.app_version".to_string()));
    }
    if config.cache.backend == StoreBackend::File && config.cache.dir.is_none() {
        return Err(ConfigError::MissingField("cache.dir".to_string()));
    }
    if config.patcher.version_trust_window_ms == 0 {
        return Err(ConfigError::ValidationError(
            "patcher.version_trust_window_ms must be positive".to_string(),
        ));
    }
    Ok(())
}
