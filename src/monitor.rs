use crate::core::{SystemStatus, UNKNOWN};
use crate::gpu;
use crate::util::error::MonitorError;
use log::warn;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub type Result<T, E = MonitorError> = std::result::Result<T, E>;

/// Where the status probes look. Defaults target the live host; tests point
/// them at paths and tools that do not exist.
#[derive(Debug, Clone)]
pub struct ProbeTargets {
    pub cpu_governor: PathBuf,
    pub swappiness: PathBuf,
    pub nvidia_smi: String,
}

impl Default for ProbeTargets {
    fn default() -> Self {
        Self {
            cpu_governor: PathBuf::from("/sys/devices/system/cpu/cpu0/cpufreq/scaling_governor"),
            swappiness: PathBuf::from("/proc/sys/vm/swappiness"),
            nvidia_smi: gpu::NVIDIA_SMI.to_string(),
        }
    }
}

// Read the first line of a sysfs/procfs file, trimmed
fn read_first_line(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| {
        MonitorError::ReadError(format!("Path: {}, Error: {}", path.display(), e))
    })?;

    let line = content.lines().next().unwrap_or_default().trim();
    if line.is_empty() {
        return Err(MonitorError::ParseError(format!(
            "{} is empty",
            path.display()
        )));
    }
    Ok(line.to_string())
}

/// Scaling governor of CPU 0 only; the governor is applied system-wide, so
/// one core is representative.
pub fn cpu_governor(targets: &ProbeTargets) -> String {
    read_first_line(&targets.cpu_governor).unwrap_or_else(|e| {
        warn!("Could not read CPU governor: {e}");
        UNKNOWN.to_string()
    })
}

pub fn memory_swappiness(targets: &ProbeTargets) -> String {
    read_first_line(&targets.swappiness).unwrap_or_else(|e| {
        warn!("Could not read swappiness: {e}");
        UNKNOWN.to_string()
    })
}

pub fn gpu_persistence(targets: &ProbeTargets) -> String {
    gpu::query_persistence_mode(&targets.nvidia_smi).unwrap_or_else(|e| {
        warn!("Could not query GPU persistence mode: {e}");
        UNKNOWN.to_string()
    })
}

/// Collect the unified snapshot. Each probe degrades to "Unknown" on its
/// own; one failing probe never stops the others.
pub fn collect_status(targets: &ProbeTargets, current_mode: Option<&str>) -> SystemStatus {
    SystemStatus {
        cpu_governor: cpu_governor(targets),
        gpu_persistence: gpu_persistence(targets),
        memory_swappiness: memory_swappiness(targets),
        current_mode: current_mode.unwrap_or(UNKNOWN).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_targets() -> ProbeTargets {
        ProbeTargets {
            cpu_governor: PathBuf::from("/nonexistent/scaling_governor"),
            swappiness: PathBuf::from("/nonexistent/swappiness"),
            nvidia_smi: "sysmode-test-no-such-tool".to_string(),
        }
    }

    #[test]
    fn test_all_probes_degrade_to_unknown() {
        let status = collect_status(&unreachable_targets(), None);
        assert_eq!(status.cpu_governor, UNKNOWN);
        assert_eq!(status.gpu_persistence, UNKNOWN);
        assert_eq!(status.memory_swappiness, UNKNOWN);
        assert_eq!(status.current_mode, UNKNOWN);
    }

    #[test]
    fn test_current_mode_is_reported_even_when_probes_fail() {
        let status = collect_status(&unreachable_targets(), Some("gaming"));
        assert_eq!(status.current_mode, "gaming");
        assert_eq!(status.cpu_governor, UNKNOWN);
    }

    #[test]
    fn test_first_line_only_is_read() {
        let path = std::env::temp_dir().join(format!("sysmode-probe-{}", std::process::id()));
        fs::write(&path, "performance\npowersave\n").unwrap();
        assert_eq!(read_first_line(&path).unwrap(), "performance");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_empty_file_is_a_parse_error() {
        let path =
            std::env::temp_dir().join(format!("sysmode-probe-empty-{}", std::process::id()));
        fs::write(&path, "\n").unwrap();
        assert!(matches!(
            read_first_line(&path).unwrap_err(),
            MonitorError::ParseError(_)
        ));
        let _ = fs::remove_file(&path);
    }
}
