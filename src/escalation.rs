//! Escalation policy
//!
//! Pure decision function mapping (accumulated warnings, max triggered
//! severity, community thresholds) to a punitive action. No I/O; the
//! orchestrator supplies the inputs and acts on the output.

use crate::config::CommunityConfig;
use serde::{Deserialize, Serialize};

/// Closed set of action classes a filter can suggest and the policy can
/// decide. Kept separate from the richer case taxonomy so new manual case
/// kinds never leak into the automated path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionClass {
    Warn,
    Timeout,
    Ban,
}

/// Outcome of the escalation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escalation {
    pub action: ActionClass,
    /// Set only for time-bound sanctions (timeouts).
    pub duration_secs: Option<u64>,
}

impl Escalation {
    fn warn() -> Self {
        Self {
            action: ActionClass::Warn,
            duration_secs: None,
        }
    }
}

/// Decide the sanction for one enforced event.
///
/// Always evaluates the *maximum* severity across the triggered filters,
/// so the most serious violation dominates regardless of filter order.
pub fn decide(new_warning_count: u32, max_severity: u8, config: &CommunityConfig) -> Escalation {
    // Below the threshold, everything is a plain warning.
    if new_warning_count < config.warn_threshold {
        return Escalation::warn();
    }

    if max_severity >= config.ban_severity {
        return Escalation {
            action: ActionClass::Ban,
            duration_secs: None,
        };
    }

    if let Some(secs) = config.mute_duration_for(max_severity) {
        return Escalation {
            action: ActionClass::Timeout,
            duration_secs: Some(secs),
        };
    }

    Escalation::warn()
}
