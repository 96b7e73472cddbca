// Configuration loading functionality
use std::fs;
use std::path::PathBuf;

use crate::config::types::{AppConfig, ConfigError};
use log::{debug, warn};

// The primary function to load application configuration.
// A path given via SYSMODE_CONFIG is authoritative: its errors are reported
// to the caller. Discovered paths (user-specific, then system-wide) fall
// through to the defaults on any failure.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    if let Ok(path) = std::env::var("SYSMODE_CONFIG") {
        let path = PathBuf::from(path);
        debug!("Loading config from SYSMODE_CONFIG: {}", path.display());
        let contents = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        return Ok(config);
    }

    let mut config_paths: Vec<PathBuf> = Vec::new();

    // User-specific path
    if let Some(home_dir) = dirs::home_dir() {
        config_paths.push(home_dir.join(".config/sysmode/config.toml"));
    } else {
        warn!("Could not determine home directory; user-specific config will not be loaded");
    }

    // System-wide path
    config_paths.push(PathBuf::from("/etc/sysmode/config.toml"));

    for path in config_paths {
        if !path.exists() {
            continue;
        }
        debug!("Attempting to load config from {}", path.display());
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                Ok(config) => match config.validate() {
                    Ok(()) => return Ok(config),
                    Err(e) => warn!("Ignoring invalid config file {}: {e}", path.display()),
                },
                Err(e) => warn!("Error parsing config file {}: {e}", path.display()),
            },
            Err(e) => warn!("Error reading config file {}: {e}", path.display()),
        }
    }

    debug!("No configuration file found; using default configuration");
    Ok(AppConfig::default())
}
