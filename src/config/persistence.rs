use crate::error::{CowError, Result};
use std::path::Path;

use crate::config::paths::*;
use crate::config::schema::*;

/// Load the config from the default location, or defaults if there is none.
pub fn load_config() -> Result<CowConfig> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        tracing::debug!(
            "No config file at {}, using defaults",
            config_path.display()
        );
        return Ok(CowConfig::default());
    }

    load_config_from(&config_path)
}

pub fn load_config_from(config_path: &Path) -> Result<CowConfig> {
    let toml_content = std::fs::read_to_string(config_path).map_err(|e| {
        CowError::Config(format!(
            "Failed to read config file {}: {}",
            config_path.display(),
            e
        ))
    })?;

    toml::from_str(&toml_content)
        .map_err(|e| CowError::Config(format!("Failed to parse config: {}", e)))
}

pub fn save_config(config: &CowConfig, config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            CowError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| CowError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(config_path, toml_str)
        .map_err(|e| CowError::Config(format!("Failed to write config file: {}", e)))?;
    Ok(())
}
