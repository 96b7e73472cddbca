use clap::ValueEnum;

/// Sentinel reported whenever a host fact cannot be determined.
pub const UNKNOWN: &str = "Unknown";

/// Stable identifier for the three operating profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeId {
    Gaming,
    Ai,
    Balanced,
}

impl ModeId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gaming => "gaming",
            Self::Ai => "ai",
            Self::Balanced => "balanced",
        }
    }
}

impl std::fmt::Display for ModeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The host tunables one mode controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSettings {
    pub governor: String,
    pub gpu_persistence: bool,
    pub swappiness: u8,
}

impl ModeSettings {
    /// Host defaults applied when a mode is released: the stock desktop
    /// governor, persistence off, kernel default swappiness.
    pub fn neutral() -> Self {
        Self {
            governor: "schedutil".to_string(),
            gpu_persistence: false,
            swappiness: 60,
        }
    }
}

/// Name plus whether the manager currently considers this mode active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeStatus {
    pub name: String,
    pub active: bool,
}

/// Point-in-time snapshot of the tunables this tool manages.
///
/// Values are reported as the host spells them; any probe that fails
/// degrades to [`UNKNOWN`] instead of erroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemStatus {
    pub cpu_governor: String,
    pub gpu_persistence: String,
    pub memory_swappiness: String,
    pub current_mode: String,
}

/// One row of the detailed GPU table, fields as the management tool
/// prints them (no units).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuInfo {
    pub index: String,
    pub name: String,
    pub utilization_pct: String,
    pub memory_used_mib: String,
    pub memory_total_mib: String,
}
