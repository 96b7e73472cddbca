use crate::util::error::StateError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default location of the persisted current-mode record.
pub const DEFAULT_STATE_PATH: &str = "/etc/xdg/sysmode/state.toml";

/// On-disk record of the active mode, so successive one-shot invocations
/// agree on what is currently applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeState {
    pub mode: String,
    /// RFC 3339 timestamp of the switch.
    pub switched_at: String,
}

/// Load the persisted record. A missing, unreadable, or unparsable file is
/// reported as no state at all; stale state must never block the tool.
pub fn load(path: &Path) -> Option<ModeState> {
    if !path.exists() {
        return None;
    }

    match fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Ignoring unparsable state file {}: {e}", path.display());
                None
            }
        },
        Err(e) => {
            warn!("Cannot read state file {}: {e}", path.display());
            None
        }
    }
}

/// Persist the record with write-replace semantics: serialize to a sibling
/// temp file, then rename into place so readers never observe a partial
/// write.
pub fn save(path: &Path, mode: &str) -> Result<(), StateError> {
    let state = ModeState {
        mode: mode.to_string(),
        switched_at: chrono::Local::now().to_rfc3339(),
    };
    let serialized = toml::to_string(&state)?;

    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }

    let tmp = path.with_extension("toml.tmp");
    fs::write(&tmp, serialized)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
