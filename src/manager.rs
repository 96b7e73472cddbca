use crate::control::HostControl;
use crate::core::SystemStatus;
use crate::modes::Mode;
use crate::monitor::{self, ProbeTargets};
use crate::util::error::ControlError;
use log::{info, warn};

/// Owns the registered modes and the single "current mode" pointer.
///
/// Invariant: `current_mode`, when set, names a registered mode. It starts
/// unset and changes only through [`Self::switch_to_mode`] (or
/// [`Self::restore`], which refuses unregistered names).
pub struct SystemModeManager {
    modes: Vec<Mode>,
    current_mode: Option<String>,
}

impl SystemModeManager {
    pub fn new() -> Self {
        Self {
            modes: Vec::new(),
            current_mode: None,
        }
    }

    /// Register a mode under its name. A duplicate name silently replaces
    /// the earlier registration in place, keeping the listing order.
    pub fn register_mode(&mut self, mode: Mode) {
        if let Some(existing) = self.modes.iter_mut().find(|m| m.name() == mode.name()) {
            *existing = mode;
        } else {
            self.modes.push(mode);
        }
    }

    pub fn get_mode(&self, name: &str) -> Option<&Mode> {
        self.modes.iter().find(|m| m.name() == name)
    }

    /// Mode names in registration order.
    pub fn available_modes(&self) -> Vec<&str> {
        self.modes.iter().map(Mode::name).collect()
    }

    pub fn get_current_mode(&self) -> Option<&str> {
        self.current_mode.as_deref()
    }

    /// Adopt a persisted current-mode name. Names that are no longer
    /// registered are ignored so the registry invariant holds.
    pub fn restore(&mut self, name: &str) {
        if self.get_mode(name).is_some() {
            self.current_mode = Some(name.to_string());
        } else {
            warn!("Ignoring persisted mode '{name}': not a registered mode");
        }
    }

    /// Transition to the named mode: release the current mode's settings
    /// (failure logged, not fatal), then apply the target's. The current
    /// mode changes only if the target's `enable` succeeds.
    pub fn switch_to_mode(
        &mut self,
        name: &str,
        host: &mut dyn HostControl,
    ) -> Result<(), ControlError> {
        let target_idx = self
            .modes
            .iter()
            .position(|m| m.name() == name)
            .ok_or_else(|| ControlError::UnknownMode(name.to_string()))?;

        info!("Switching to {name} mode");

        if let Some(current) = &self.current_mode {
            if let Some(mode) = self.get_mode(current) {
                if let Err(e) = mode.disable(host) {
                    warn!("Releasing {current} mode settings failed, continuing: {e}");
                }
            }
        }

        self.modes[target_idx].enable(host)?;
        self.current_mode = Some(name.to_string());
        info!("Now in {name} mode");
        Ok(())
    }

    /// Live host facts plus the current mode ("Unknown" when unset).
    pub fn system_status(&self, targets: &ProbeTargets) -> SystemStatus {
        monitor::collect_status(targets, self.get_current_mode())
    }
}

impl Default for SystemModeManager {
    fn default() -> Self {
        Self::new()
    }
}
