use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to write to sysfs path: {0}")]
    WriteError(String),

    #[error("Invalid value for setting: {0}")]
    InvalidValueError(String),

    #[error("Control action not supported: {0}")]
    NotSupported(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Path missing: {0}")]
    PathMissing(String),

    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("GPU management tool failed: {0}")]
    GpuCommand(String),
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Failed to read sysfs path: {0}")]
    ReadError(String),

    #[error("Failed to parse value: {0}")]
    ParseError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize mode state: {0}")]
    Toml(#[from] toml::ser::Error),
}
