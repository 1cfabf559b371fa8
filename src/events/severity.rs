use serde::{Deserialize, Serialize};

use crate::authz::{Decision, Reason};

/// Severity levels for audit events, used by sinks for retention and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Authenticated actor was refused: keep long-term
    Critical,
    #[default]
    Important,
    /// Routine allows: aggressively trimmed
    Noise,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Important => "important",
            Severity::Noise => "noise",
        }
    }

    pub fn for_decision(decision: &Decision) -> Self {
        match decision.reason {
            Reason::Unauthenticated | Reason::AdminOverride => Severity::Important,
            Reason::Granted => Severity::Noise,
            _ => Severity::Critical,
        }
    }
}
