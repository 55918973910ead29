//! Install, merge and snapshot compilation events

use serde::{Deserialize, Serialize};

use sealpatch_types::ConflictDecision;

/// Events emitted while compiling and dispatching install-family
/// operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstallEvent {
    /// Step compilation started for a request.
    CompileStarted { files: usize, merges: usize },

    /// A file was classified and its step(s) planned.
    FilePlanned {
        name: String,
        decision: ConflictDecision,
    },

    /// An existing destination will be left untouched.
    FileSkipped { name: String },

    /// A directory merge was planned.
    MergePlanned { name: String },

    /// A merge destination does not exist; the one operation is dropped
    /// and the rest of the sequence continues.
    MergeTargetMissing { destination: String },

    /// The KDK extensions tree will be layered in before file installs.
    KdkMergePlanned { kdk: String, full_merge: bool },

    /// The compiled sequence was handed to the privileged executor.
    ScriptDispatched { steps: usize },
}

impl InstallEvent {
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        match self {
            InstallEvent::CompileStarted { .. } => "compile_started",
            InstallEvent::FilePlanned { .. } => "file_planned",
            InstallEvent::FileSkipped { .. } => "file_skipped",
            InstallEvent::MergePlanned { .. } => "merge_planned",
            InstallEvent::MergeTargetMissing { .. } => "merge_target_missing",
            InstallEvent::KdkMergePlanned { .. } => "kdk_merge_planned",
            InstallEvent::ScriptDispatched { .. } => "script_dispatched",
        }
    }

    #[must_use]
    pub fn parameters(&self) -> Vec<String> {
        match self {
            InstallEvent::CompileStarted { files, merges } => {
                vec![files.to_string(), merges.to_string()]
            }
            InstallEvent::FilePlanned { name, decision } => {
                vec![name.clone(), decision.to_string()]
            }
            InstallEvent::FileSkipped { name } | InstallEvent::MergePlanned { name } => {
                vec![name.clone()]
            }
            InstallEvent::MergeTargetMissing { destination } => vec![destination.clone()],
            InstallEvent::KdkMergePlanned { kdk, full_merge } => {
                vec![kdk.clone(), full_merge.to_string()]
            }
            InstallEvent::ScriptDispatched { steps } => vec![steps.to_string()],
        }
    }
}
