//! Pre-execution veto layer for launch targets and typed text.
//!
//! Every string that can reach a shell or keyboard passes through here
//! before the controller is invoked. Matching is a case-insensitive
//! substring scan against a fixed deny-list; the verdict names the matched
//! category but never echoes the payload back into logs or responses.

/// What kind of string is being checked. Launch targets additionally go
/// through the allow-list (when one is configured).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    LaunchTarget,
    FreeText,
}

/// Outcome of a safety check. Computed fresh per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl Verdict {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Deny-list entries: (category shown to the caller, lowercase fragment).
const DENY_PATTERNS: &[(&str, &str)] = &[
    ("recursive filesystem delete", "rm -rf"),
    ("recursive filesystem delete", "rm -fr"),
    ("recursive filesystem delete", "rm --recursive"),
    ("recursive filesystem delete", "rmdir /s"),
    ("recursive filesystem delete", "del /f /s /q"),
    ("disk wipe", "mkfs"),
    ("disk wipe", "of=/dev/sd"),
    ("disk wipe", "of=/dev/nvme"),
    ("disk wipe", "format c:"),
    ("raw device write", "> /dev/sd"),
    ("fork bomb", ":(){"),
    ("fork bomb", ":() {"),
    ("privilege escalation", "sudo su"),
    ("privilege escalation", "sudo rm"),
    ("privilege escalation", "sudo dd"),
    ("privilege escalation", "chmod -r 777 /"),
    ("power control", "shutdown"),
    ("power control", "reboot"),
    ("power control", "poweroff"),
    ("power control", "init 0"),
];

/// Guard against obviously destructive inputs.
pub struct SafetyGuard {
    allowed_launch_targets: Vec<String>,
}

impl SafetyGuard {
    /// Build a guard. `allowed_launch_targets` is an optional allow-list:
    /// when non-empty, launch targets must appear on it (exact match after
    /// lowercasing) in addition to clearing the deny-list.
    pub fn new(allowed_launch_targets: Vec<String>) -> Self {
        Self {
            allowed_launch_targets: allowed_launch_targets
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Check a fully resolved string value against the deny-list.
    pub fn check(&self, kind: OperationKind, payload: &str) -> Verdict {
        let normalized = payload.trim().to_lowercase();

        for (category, fragment) in DENY_PATTERNS {
            if normalized.contains(fragment) {
                let surface = match kind {
                    OperationKind::LaunchTarget => "launch target",
                    OperationKind::FreeText => "text input",
                };
                return Verdict::deny(format!(
                    "{surface} rejected: matches destructive pattern category '{category}'"
                ));
            }
        }

        if kind == OperationKind::LaunchTarget
            && !self.allowed_launch_targets.is_empty()
            && !self.allowed_launch_targets.contains(&normalized)
        {
            return Verdict::deny("launch target is not on the configured allow list");
        }

        Verdict::allow()
    }
}

impl Default for SafetyGuard {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
