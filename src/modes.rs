use crate::config::ModeOverrides;
use crate::control::HostControl;
use crate::core::{ModeId, ModeSettings, ModeStatus};
use crate::util::error::ControlError;
use log::{info, warn};

/// One operating profile: identity, what it is for, and the tunables it
/// applies. The set of modes is closed; construct them with [`Mode::gaming`],
/// [`Mode::ai`], or [`Mode::balanced`].
#[derive(Debug, Clone)]
pub struct Mode {
    pub id: ModeId,
    pub description: String,
    pub settings: ModeSettings,
}

impl Mode {
    /// Maximum interactive throughput: performance governor, GPU kept
    /// initialized between frames, swap only under real pressure.
    pub fn gaming() -> Self {
        Self {
            id: ModeId::Gaming,
            description: "Maximum performance for games: performance governor, \
                          GPU persistence on, low swappiness"
                .to_string(),
            settings: ModeSettings {
                governor: "performance".to_string(),
                gpu_persistence: true,
                swappiness: 10,
            },
        }
    }

    /// CUDA development and training runs: like gaming, but swapping is
    /// suppressed almost entirely so large tensors stay resident.
    pub fn ai() -> Self {
        Self {
            id: ModeId::Ai,
            description: "AI and CUDA workloads: performance governor, \
                          GPU persistence on, minimal swapping"
                .to_string(),
            settings: ModeSettings {
                governor: "performance".to_string(),
                gpu_persistence: true,
                swappiness: 1,
            },
        }
    }

    /// Stock desktop behavior; identical to the neutral payload `disable`
    /// applies.
    pub fn balanced() -> Self {
        Self {
            id: ModeId::Balanced,
            description: "Standard desktop defaults: schedutil governor, \
                          GPU persistence off, default swappiness"
                .to_string(),
            settings: ModeSettings::neutral(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.id.as_str()
    }

    /// Replace payload fields the config file overrides.
    pub fn apply_overrides(&mut self, overrides: &ModeOverrides) {
        if let Some(governor) = &overrides.governor {
            self.settings.governor = governor.clone();
        }
        if let Some(persistence) = overrides.gpu_persistence {
            self.settings.gpu_persistence = persistence;
        }
        if let Some(swappiness) = overrides.swappiness {
            self.settings.swappiness = swappiness;
        }
    }

    /// Apply this mode's payload to the host: governor, then GPU
    /// persistence, then swappiness.
    pub fn enable(&self, host: &mut dyn HostControl) -> Result<(), ControlError> {
        apply_settings(&self.settings, host)
    }

    /// Return the host to the neutral payload.
    pub fn disable(&self, host: &mut dyn HostControl) -> Result<(), ControlError> {
        apply_settings(&ModeSettings::neutral(), host)
    }

    /// Whether the manager currently considers this mode active.
    pub fn status(&self, current_mode: Option<&str>) -> ModeStatus {
        ModeStatus {
            name: self.name().to_string(),
            active: current_mode == Some(self.name()),
        }
    }
}

fn apply_settings(settings: &ModeSettings, host: &mut dyn HostControl) -> Result<(), ControlError> {
    try_apply("CPU governor", &settings.governor, || {
        host.apply_cpu_governor(&settings.governor)
    })?;
    try_apply(
        "GPU persistence",
        if settings.gpu_persistence { "on" } else { "off" },
        || host.set_gpu_persistence(settings.gpu_persistence),
    )?;
    try_apply("swappiness", &settings.swappiness.to_string(), || {
        host.set_swappiness(settings.swappiness)
    })?;
    Ok(())
}

/// Apply one tunable. A host that lacks the tunable entirely is logged and
/// skipped; every other failure aborts the transition.
fn try_apply<F>(feature_name: &str, value_description: &str, apply_fn: F) -> Result<(), ControlError>
where
    F: FnOnce() -> Result<(), ControlError>,
{
    info!("Setting {feature_name} to '{value_description}'");

    match apply_fn() {
        Ok(()) => Ok(()),
        Err(ControlError::NotSupported(msg)) => {
            warn!("{feature_name} is not supported on this host, skipping: {msg}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingHost {
        ops: Vec<String>,
    }

    impl HostControl for RecordingHost {
        fn apply_cpu_governor(&mut self, governor: &str) -> Result<(), ControlError> {
            self.ops.push(format!("governor:{governor}"));
            Ok(())
        }

        fn set_gpu_persistence(&mut self, enabled: bool) -> Result<(), ControlError> {
            self.ops.push(format!("persistence:{enabled}"));
            Ok(())
        }

        fn set_swappiness(&mut self, value: u8) -> Result<(), ControlError> {
            self.ops.push(format!("swappiness:{value}"));
            Ok(())
        }
    }

    struct UnsupportedGpuHost {
        inner: RecordingHost,
    }

    impl HostControl for UnsupportedGpuHost {
        fn apply_cpu_governor(&mut self, governor: &str) -> Result<(), ControlError> {
            self.inner.apply_cpu_governor(governor)
        }

        fn set_gpu_persistence(&mut self, _enabled: bool) -> Result<(), ControlError> {
            Err(ControlError::NotSupported("no NVIDIA tool".to_string()))
        }

        fn set_swappiness(&mut self, value: u8) -> Result<(), ControlError> {
            self.inner.set_swappiness(value)
        }
    }

    #[test]
    fn test_payloads_differ_per_mode() {
        assert_eq!(Mode::gaming().settings.swappiness, 10);
        assert_eq!(Mode::ai().settings.swappiness, 1);
        assert_eq!(Mode::balanced().settings, ModeSettings::neutral());
        assert!(Mode::gaming().settings.gpu_persistence);
        assert!(!Mode::balanced().settings.gpu_persistence);
    }

    #[test]
    fn test_enable_applies_payload_in_order() {
        let mut host = RecordingHost::default();
        Mode::gaming().enable(&mut host).unwrap();
        assert_eq!(
            host.ops,
            vec!["governor:performance", "persistence:true", "swappiness:10"]
        );
    }

    #[test]
    fn test_disable_applies_neutral_payload() {
        let mut host = RecordingHost::default();
        Mode::ai().disable(&mut host).unwrap();
        assert_eq!(
            host.ops,
            vec!["governor:schedutil", "persistence:false", "swappiness:60"]
        );
    }

    #[test]
    fn test_unsupported_tunable_is_skipped() {
        let mut host = UnsupportedGpuHost {
            inner: RecordingHost::default(),
        };
        Mode::gaming().enable(&mut host).unwrap();
        assert_eq!(
            host.inner.ops,
            vec!["governor:performance", "swappiness:10"]
        );
    }

    #[test]
    fn test_overrides_replace_individual_fields() {
        let mut mode = Mode::gaming();
        mode.apply_overrides(&ModeOverrides {
            governor: None,
            gpu_persistence: None,
            swappiness: Some(5),
        });
        assert_eq!(mode.settings.governor, "performance");
        assert_eq!(mode.settings.swappiness, 5);
    }

    #[test]
    fn test_active_flag_tracks_current_mode() {
        let gaming = Mode::gaming();
        assert!(gaming.status(Some("gaming")).active);
        assert!(!gaming.status(Some("ai")).active);
        assert!(!gaming.status(None).active);
    }
}
