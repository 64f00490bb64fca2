// Configuration
//
// Host-facing knobs for instance construction, loadable from a TOML
// fragment so front-ends can keep per-game settings on disk.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Instance configuration
///
/// Every field has a sensible default, so `EmulatorConfig::default()` is
/// the common path and TOML files only need to name what they change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Use this mapper number instead of the one in the ROM header
    ///
    /// Useful for dumps with mislabeled headers.
    pub mapper_override: Option<u8>,

    /// Plug a controller into the second port ($4017 reads 0 otherwise)
    pub connect_second_controller: bool,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            mapper_override: None,
            connect_second_controller: false,
        }
    }
}

/// Errors raised while loading a configuration file
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl EmulatorConfig {
    /// Parse a TOML fragment
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a file, falling back to defaults when it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path.as_ref()) {
            Ok(text) => Self::from_toml_str(&text).unwrap_or_else(|e| {
                log::warn!("{}; using default configuration", e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }
}
