mod config;
mod conflict;
mod control;
mod core;
mod gpu;
mod manager;
mod modes;
mod monitor;
mod state;
mod util;

use crate::config::AppConfig;
use crate::control::SysfsHost;
use crate::core::ModeId;
use crate::manager::SystemModeManager;
use crate::modes::Mode;
use crate::monitor::ProbeTargets;
use crate::util::error::ControlError;
use clap::Parser;
use log::warn;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Switch system mode or show mode information
    Switch {
        /// Mode to switch to
        #[clap(short, long, value_enum)]
        mode: Option<ModeId>,
        /// List available modes
        #[clap(short, long)]
        list: bool,
        /// Show current system status
        #[clap(short, long)]
        status: bool,
    },
    /// List all available system modes
    Modes,
    /// Show current system status including GPU telemetry
    Status,
    /// Enable a specific system mode
    Enable {
        #[clap(value_enum)]
        mode: ModeId,
    },
    /// Disable the current mode and return to balanced
    Disable,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {e}. Using default values.");
            AppConfig::default()
        }
    };

    let cli = Cli::parse();

    let mut manager = build_manager(&config);
    if let Some(saved) = state::load(&config.state_file) {
        manager.restore(&saved.mode);
    }

    let targets = ProbeTargets::default();
    let mut host = SysfsHost::default();

    let command_result = match cli.command {
        Commands::Switch { mode, list, status } => {
            if list {
                print_modes(&manager);
                Ok(())
            } else if status {
                print_status(&manager, &targets);
                Ok(())
            } else if let Some(mode) = mode {
                switch_mode(&mut manager, mode.as_str(), &mut host, &config)
            } else {
                match manager.get_current_mode() {
                    Some(current) => println!("Current mode: {current}"),
                    None => println!("No mode currently active (using system defaults)"),
                }
                print_modes(&manager);
                Ok(())
            }
        }
        Commands::Modes => {
            print_modes(&manager);
            Ok(())
        }
        Commands::Status => {
            print_status(&manager, &targets);
            Ok(())
        }
        Commands::Enable { mode } => switch_mode(&mut manager, mode.as_str(), &mut host, &config),
        Commands::Disable => {
            let current = manager.get_current_mode().map(str::to_string);
            match current {
                Some(current) if current != ModeId::Balanced.as_str() => {
                    println!("Disabling {current} mode...");
                    switch_mode(&mut manager, ModeId::Balanced.as_str(), &mut host, &config)
                }
                _ => {
                    println!("Already using balanced system defaults, nothing to disable.");
                    Ok(())
                }
            }
        }
    };

    if let Err(e) = command_result {
        eprintln!("Error executing command: {e}");
        if matches!(e, ControlError::PermissionDenied(_)) {
            eprintln!(
                "Hint: This operation may require administrator privileges (e.g., run with sudo)."
            );
        }
        std::process::exit(1);
    }
}

/// Construct the manager with all three modes, with config overrides folded
/// into each payload.
fn build_manager(config: &AppConfig) -> SystemModeManager {
    let mut manager = SystemModeManager::new();
    for mut mode in [Mode::gaming(), Mode::ai(), Mode::balanced()] {
        let overrides = match mode.id {
            ModeId::Gaming => &config.gaming,
            ModeId::Ai => &config.ai,
            ModeId::Balanced => &config.balanced,
        };
        mode.apply_overrides(overrides);
        manager.register_mode(mode);
    }
    manager
}

fn switch_mode(
    manager: &mut SystemModeManager,
    name: &str,
    host: &mut SysfsHost,
    config: &AppConfig,
) -> Result<(), ControlError> {
    let conflicts = conflict::detect_conflicts();
    if conflicts.has_conflicts() {
        warn!("{}", conflicts.message());
    }

    println!("Switching to {name} mode...");
    manager.switch_to_mode(name, host)?;
    println!("Successfully switched to {name} mode");
    if let Some(mode) = manager.get_mode(name) {
        println!("{}", mode.description);
    }

    if let Err(e) = state::save(&config.state_file, name) {
        warn!("Mode switched, but recording it for later invocations failed: {e}");
    }
    Ok(())
}

fn print_modes(manager: &SystemModeManager) {
    println!("--- Available System Modes ---");
    for name in manager.available_modes() {
        let Some(mode) = manager.get_mode(name) else {
            continue;
        };
        let status = mode.status(manager.get_current_mode());
        let marker = if status.active { "active  " } else { "inactive" };
        println!("  {name:<10} [{marker}]  {}", mode.description);
    }
}

fn print_status(manager: &SystemModeManager, targets: &ProbeTargets) {
    let status = manager.system_status(targets);

    println!("--- System Status ---");
    println!("CPU Governor: {}", status.cpu_governor);
    println!("GPU Persistence: {}", status.gpu_persistence);
    println!("Memory Swappiness: {}", status.memory_swappiness);
    println!("Current Mode: {}", status.current_mode);

    match gpu::query_gpus(&targets.nvidia_smi) {
        Ok(gpus) if !gpus.is_empty() => {
            println!("\n--- GPU Status ---");
            for info in gpus {
                println!(
                    "  GPU {}: {}, Utilization: {}%, Memory: {} MiB / {} MiB",
                    info.index,
                    info.name,
                    info.utilization_pct,
                    info.memory_used_mib,
                    info.memory_total_mib
                );
            }
        }
        Ok(_) => println!("\nNo GPUs reported."),
        Err(e) => println!("\nCould not retrieve GPU information: {e}"),
    }
}
