// Configuration types and structures for sysmode
use crate::state::DEFAULT_STATE_PATH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Field-by-field overrides for one mode's settings payload. Absent fields
/// keep the built-in value.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct ModeOverrides {
    pub governor: Option<String>,
    pub gpu_persistence: Option<bool>,
    pub swappiness: Option<u8>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AppConfig {
    /// Where the current-mode record is persisted between invocations.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default)]
    pub gaming: ModeOverrides,
    #[serde(default)]
    pub ai: ModeOverrides,
    #[serde(default)]
    pub balanced: ModeOverrides,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (section, overrides) in [
            ("gaming", &self.gaming),
            ("ai", &self.ai),
            ("balanced", &self.balanced),
        ] {
            if let Some(swappiness) = overrides.swappiness {
                if swappiness > 100 {
                    return Err(ConfigError::ValidationError(format!(
                        "[{section}] swappiness must be between 0 and 100, got {swappiness}"
                    )));
                }
            }
            if let Some(governor) = &overrides.governor {
                if governor.trim().is_empty() {
                    return Err(ConfigError::ValidationError(format!(
                        "[{section}] governor must not be empty"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            gaming: ModeOverrides::default(),
            ai: ModeOverrides::default(),
            balanced: ModeOverrides::default(),
        }
    }
}

fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_PATH)
}

// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(toml::de::Error),
    ValidationError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::TomlError(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "I/O error: {e}"),
            Self::TomlError(e) => write!(f, "TOML parsing error: {e}"),
            Self::ValidationError(s) => write!(f, "Configuration validation error: {s}"),
        }
    }
}

impl std::error::Error for ConfigError {}
