use std::process::{Command, Stdio};

/// Services known to manage the same tunables a mode switch touches.
/// Their daemons reapply their own policy and can silently undo ours.
const CONFLICTING_SERVICES: &[(&str, &str)] = &[
    ("tlp.service", "TLP"),
    ("power-profiles-daemon.service", "GNOME Power Profiles daemon"),
    ("tuned.service", "tuned"),
    ("gamemoded.service", "GameMode daemon"),
];

/// Power-management services detected alongside this tool.
#[derive(Debug, Default)]
pub struct ConflictDetection {
    pub services: Vec<&'static str>,
}

impl ConflictDetection {
    pub fn has_conflicts(&self) -> bool {
        !self.services.is_empty()
    }

    /// Human-readable warning rendered before a switch.
    pub fn message(&self) -> String {
        let mut message = String::from(
            "Other power management services are active and may override mode settings:\n",
        );
        for service in &self.services {
            message.push_str(&format!("- {service}\n"));
        }
        message.push_str("Mode settings may not stick until these are disabled.");
        message
    }
}

fn systemctl_exists() -> bool {
    Command::new("sh")
        .arg("-c")
        .arg("command -v systemctl")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

fn is_service_active(service: &str) -> bool {
    Command::new("systemctl")
        .arg("--quiet")
        .arg("is-active")
        .arg(service)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Probe for services that would fight a mode switch. Hosts without
/// systemctl report no conflicts.
pub fn detect_conflicts() -> ConflictDetection {
    let mut conflicts = ConflictDetection::default();

    if !systemctl_exists() {
        return conflicts;
    }

    for (service, label) in CONFLICTING_SERVICES {
        if is_service_active(service) {
            conflicts.services.push(label);
        }
    }

    conflicts
}
