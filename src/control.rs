use crate::gpu;
use crate::util::error::ControlError;
use log::debug;
use std::{fs, io, path::Path};

pub type Result<T, E = ControlError> = std::result::Result<T, E>;

const SWAPPINESS_PATH: &str = "/proc/sys/vm/swappiness";
const AVAILABLE_GOVERNORS_PATH: &str =
    "/sys/devices/system/cpu/cpu0/cpufreq/scaling_available_governors";

/// The privileged host mutations a mode performs, behind one seam so the
/// manager's transition logic can run against fakes.
pub trait HostControl {
    fn apply_cpu_governor(&mut self, governor: &str) -> Result<()>;
    fn set_gpu_persistence(&mut self, enabled: bool) -> Result<()>;
    fn set_swappiness(&mut self, value: u8) -> Result<()>;
}

/// Real host: sysfs/procfs writes plus the NVIDIA management tool.
pub struct SysfsHost {
    nvidia_smi: String,
}

impl Default for SysfsHost {
    fn default() -> Self {
        Self {
            nvidia_smi: gpu::NVIDIA_SMI.to_string(),
        }
    }
}

impl HostControl for SysfsHost {
    fn apply_cpu_governor(&mut self, governor: &str) -> Result<()> {
        validate_governor(governor)?;

        let num_cores = logical_core_count()?;
        for core_id in 0..num_cores {
            let path = format!("/sys/devices/system/cpu/cpu{core_id}/cpufreq/scaling_governor");
            if Path::new(&path).exists() {
                write_sysfs_value(&path, governor)?;
            } else {
                // Offline cores have no cpufreq directory; skip them.
                debug!("No cpufreq for core {core_id}, skipping");
            }
        }
        Ok(())
    }

    fn set_gpu_persistence(&mut self, enabled: bool) -> Result<()> {
        gpu::set_persistence(&self.nvidia_smi, enabled)
    }

    fn set_swappiness(&mut self, value: u8) -> Result<()> {
        if value > 100 {
            return Err(ControlError::InvalidValueError(format!(
                "Swappiness must be between 0 and 100, got {value}"
            )));
        }
        write_sysfs_value(SWAPPINESS_PATH, &value.to_string())
    }
}

// Write a value to a sysfs/procfs file
fn write_sysfs_value(path: impl AsRef<Path>, value: &str) -> Result<()> {
    let p = path.as_ref();

    fs::write(p, value).map_err(|e| {
        let error_msg = format!("Path: {}, Value: '{}', Error: {}", p.display(), value, e);
        match e.kind() {
            io::ErrorKind::PermissionDenied => ControlError::PermissionDenied(error_msg),
            io::ErrorKind::NotFound => {
                ControlError::PathMissing(format!("Path '{}' does not exist", p.display()))
            }
            _ => ControlError::WriteError(error_msg),
        }
    })
}

/// Reject governors the kernel does not offer, when the list is readable.
/// Hosts that do not expose the list get the write attempt as-is.
fn validate_governor(governor: &str) -> Result<()> {
    let Ok(content) = fs::read_to_string(AVAILABLE_GOVERNORS_PATH) else {
        return Ok(());
    };

    let available: Vec<&str> = content.split_whitespace().collect();
    if available.is_empty() || available.iter().any(|g| g.eq_ignore_ascii_case(governor)) {
        Ok(())
    } else {
        Err(ControlError::InvalidValueError(format!(
            "Governor '{}' is not available on this system. Valid governors: {}",
            governor,
            available.join(", ")
        )))
    }
}

/// Count logical cores that expose a cpufreq interface, falling back to the
/// OS core count when sysfs iteration yields nothing.
fn logical_core_count() -> Result<u32> {
    let path = Path::new("/sys/devices/system/cpu");
    if !path.exists() {
        return Err(ControlError::NotSupported(format!(
            "No logical cores found at {}.",
            path.display()
        )));
    }

    let entries = fs::read_dir(path)
        .map_err(|_| {
            ControlError::PermissionDenied(format!("Cannot read contents of {}.", path.display()))
        })?
        .flatten();

    let mut num_cores: u32 = 0;
    for entry in entries {
        let entry_file_name = entry.file_name();
        let Some(name) = entry_file_name.to_str() else {
            continue;
        };

        // Skip non-CPU directories (e.g., cpuidle, cpufreq)
        if !name.starts_with("cpu") || name.len() <= 3 || !name[3..].chars().all(char::is_numeric) {
            continue;
        }

        if entry.path().join("cpufreq").exists() {
            num_cores += 1;
        }
    }

    if num_cores == 0 {
        num_cores = num_cpus::get() as u32;
    }
    Ok(num_cores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_sysfs_value_roundtrip() {
        let path = std::env::temp_dir().join(format!("sysmode-sysfs-{}", std::process::id()));
        write_sysfs_value(&path, "performance").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "performance");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_write_sysfs_value_maps_missing_path() {
        let err = write_sysfs_value("/nonexistent-dir/nonexistent-file", "x").unwrap_err();
        assert!(matches!(err, ControlError::PathMissing(_)));
    }

    #[test]
    fn test_swappiness_range_is_enforced() {
        let mut host = SysfsHost::default();
        let err = host.set_swappiness(101).unwrap_err();
        assert!(matches!(err, ControlError::InvalidValueError(_)));
    }
}
