use crate::core::GpuInfo;
use crate::util::error::ControlError;
use log::debug;
use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

pub type Result<T, E = ControlError> = std::result::Result<T, E>;

/// Default NVIDIA management tool invoked for queries and persistence control.
pub const NVIDIA_SMI: &str = "nvidia-smi";

/// Hard ceiling on any single tool invocation. The tool is known to hang on
/// wedged drivers; expiry is treated the same as a nonzero exit.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Run the GPU tool and capture stdout, killing it if the deadline passes.
fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Result<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                ControlError::NotSupported(format!("{program} is not available on this host"))
            }
            _ => ControlError::GpuCommand(format!("failed to run {program}: {e}")),
        })?;

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let mut stdout = String::new();
                if let Some(mut out) = child.stdout.take() {
                    // Output is a handful of CSV lines; the pipe buffer
                    // cannot fill before the child exits.
                    out.read_to_string(&mut stdout).map_err(|e| {
                        ControlError::GpuCommand(format!("failed to read {program} output: {e}"))
                    })?;
                }
                if status.success() {
                    return Ok(stdout);
                }
                return Err(ControlError::GpuCommand(format!(
                    "{program} {} exited with {status}",
                    args.join(" ")
                )));
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ControlError::GpuCommand(format!(
                        "{program} timed out after {}s",
                        timeout.as_secs()
                    )));
                }
                thread::sleep(Duration::from_millis(25));
            }
            Err(e) => {
                return Err(ControlError::GpuCommand(format!(
                    "failed to wait for {program}: {e}"
                )));
            }
        }
    }
}

/// Query the driver persistence mode, e.g. "Enabled" or "Disabled".
///
/// Only the first GPU is consulted; the first comma-delimited token of the
/// first output line is the answer.
pub fn query_persistence_mode(program: &str) -> Result<String> {
    let stdout = run_with_timeout(
        program,
        &["--query-gpu=persistence_mode", "--format=csv,noheader,nounits"],
        COMMAND_TIMEOUT,
    )?;

    let first = stdout
        .lines()
        .next()
        .and_then(|line| line.split(',').next())
        .map(str::trim)
        .unwrap_or_default();

    if first.is_empty() {
        return Err(ControlError::GpuCommand(format!(
            "{program} returned no persistence mode"
        )));
    }
    Ok(first.to_string())
}

/// Query the per-GPU utilization table.
pub fn query_gpus(program: &str) -> Result<Vec<GpuInfo>> {
    let stdout = run_with_timeout(
        program,
        &[
            "--query-gpu=index,name,utilization.gpu,memory.used,memory.total",
            "--format=csv,noheader,nounits",
        ],
        COMMAND_TIMEOUT,
    )?;

    Ok(stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_gpu_line)
        .collect())
}

/// Parse one CSV line of the GPU table positionally. Lines with fewer than
/// five fields are dropped.
fn parse_gpu_line(line: &str) -> Option<GpuInfo> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 5 {
        debug!("Skipping malformed GPU table line: {line}");
        return None;
    }
    Some(GpuInfo {
        index: fields[0].to_string(),
        name: fields[1].to_string(),
        utilization_pct: fields[2].to_string(),
        memory_used_mib: fields[3].to_string(),
        memory_total_mib: fields[4].to_string(),
    })
}

/// Toggle driver persistence mode. Requires elevated privileges.
pub fn set_persistence(program: &str, enabled: bool) -> Result<()> {
    let flag = if enabled { "1" } else { "0" };
    run_with_timeout(program, &["-pm", flag], COMMAND_TIMEOUT).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gpu_line() {
        let info = parse_gpu_line("0, NVIDIA GeForce RTX 4060 Ti, 3, 512, 16380").unwrap();
        assert_eq!(info.index, "0");
        assert_eq!(info.name, "NVIDIA GeForce RTX 4060 Ti");
        assert_eq!(info.utilization_pct, "3");
        assert_eq!(info.memory_used_mib, "512");
        assert_eq!(info.memory_total_mib, "16380");
    }

    #[test]
    fn test_parse_gpu_line_rejects_short_rows() {
        assert!(parse_gpu_line("0, NVIDIA GeForce RTX 4060 Ti, 3").is_none());
        assert!(parse_gpu_line("").is_none());
    }

    #[test]
    fn test_missing_tool_is_not_supported() {
        let err = query_persistence_mode("sysmode-test-no-such-tool").unwrap_err();
        assert!(matches!(err, ControlError::NotSupported(_)));
    }

    #[test]
    fn test_timeout_kills_the_child() {
        let err = run_with_timeout("sleep", &["5"], Duration::from_millis(100)).unwrap_err();
        match err {
            ControlError::GpuCommand(msg) => assert!(msg.contains("timed out")),
            other => panic!("expected timeout failure, got {other:?}"),
        }
    }

    #[test]
    fn test_nonzero_exit_is_a_failure() {
        let err = run_with_timeout("false", &[], Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, ControlError::GpuCommand(_)));
    }
}
