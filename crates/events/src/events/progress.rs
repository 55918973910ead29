//! Liveness-heartbeat progress events
//!
//! The privileged process reports no step-level progress, so these
//! values are a simulated heartbeat only. They must never be used to
//! decide whether an operation finished - the executor's outcome is the
//! sole source of truth.

use serde::{Deserialize, Serialize};

/// Simulated progress signal for an active operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Heartbeat started for an operation.
    Started { operation: String },

    /// Monotonic tick; `percent` stays below 100 until completion.
    Tick { operation: String, percent: u8 },

    /// Executor reported completion; forced to 100.
    Completed { operation: String },

    /// Grace delay elapsed; display resets to 0.
    Reset { operation: String },
}

impl ProgressEvent {
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        match self {
            ProgressEvent::Started { .. } => "progress_started",
            ProgressEvent::Tick { .. } => "progress_tick",
            ProgressEvent::Completed { .. } => "progress_completed",
            ProgressEvent::Reset { .. } => "progress_reset",
        }
    }

    #[must_use]
    pub fn parameters(&self) -> Vec<String> {
        match self {
            ProgressEvent::Started { operation }
            | ProgressEvent::Completed { operation }
            | ProgressEvent::Reset { operation } => vec![operation.clone()],
            ProgressEvent::Tick { operation, percent } => {
                vec![operation.clone(), percent.to_string()]
            }
        }
    }
}
