//! Terminal operation outcomes

use serde::{Deserialize, Serialize};

/// Result of one privileged operation, reported to the caller once the
/// elevated call resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    /// Whether the concatenated script exited zero.
    pub succeeded: bool,
    /// Combined stdout/stderr captured from the privileged call,
    /// surfaced verbatim on failure.
    pub diagnostic_output: Option<String>,
    /// The boot volume was touched; the operator should be prompted to
    /// restart. Deciding to actually restart stays with the caller.
    pub requires_restart: bool,
}

impl OperationOutcome {
    /// Successful outcome for an operation that touched the boot volume.
    #[must_use]
    pub fn success(diagnostic_output: Option<String>) -> Self {
        Self {
            succeeded: true,
            diagnostic_output,
            requires_restart: true,
        }
    }

    /// Failed outcome carrying the captured diagnostic text. After a
    /// failed multi-step script the filesystem state is undefined, so
    /// no restart is suggested.
    #[must_use]
    pub fn failure(diagnostic_output: Option<String>) -> Self {
        Self {
            succeeded: false,
            diagnostic_output,
            requires_restart: false,
        }
    }
}
