//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::interaction::InteractionConfig;
use crate::config::schema::DispatchConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    Abi(serde_json::Error),
    UnknownRole(String),
    InvalidAddress(String),
    MissingAbi(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::Abi(e) => write!(f, "ABI error: {}", e),
            ConfigError::UnknownRole(name) => write!(f, "unknown contract role '{}'", name),
            ConfigError::InvalidAddress(addr) => write!(f, "invalid contract address '{}'", addr),
            ConfigError::MissingAbi(name) => write!(f, "contract '{}' has no ABI", name),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DispatchConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: DispatchConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load a TOML file and resolve it into the runtime interaction configuration.
///
/// ABI paths are resolved relative to the directory holding `path`.
pub fn load_interaction_config(path: &Path) -> Result<(DispatchConfig, InteractionConfig), ConfigError> {
    let config = load_config(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let interaction = InteractionConfig::from_config(&config, base_dir)?;
    Ok((config, interaction))
}
