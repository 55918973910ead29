//! Cross-cutting lifecycle events

use serde::{Deserialize, Serialize};

/// Events not tied to a specific domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneralEvent {
    /// Generic warning message with optional context
    Warning {
        message: String,
        context: Option<String>,
    },

    /// Generic error message with optional details
    Error {
        message: String,
        details: Option<String>,
    },

    /// Generic operation started notification
    OperationStarted { operation: String },

    /// Generic operation completion with success status
    OperationCompleted { operation: String, success: bool },

    /// Generic operation failure with error details
    OperationFailed { operation: String, error: String },

    /// Client-side tracking of an in-flight privileged call was stopped.
    /// The dispatched script is not killable; displayed state will
    /// resynchronize when the call eventually resolves.
    OperationDetached { operation: String },

    /// A completed operation requires a restart to take effect.
    RestartRequired { operation: String },
}

impl GeneralEvent {
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        match self {
            GeneralEvent::Warning { .. } => "warning",
            GeneralEvent::Error { .. } => "error",
            GeneralEvent::OperationStarted { .. } => "operation_started",
            GeneralEvent::OperationCompleted { .. } => "operation_completed",
            GeneralEvent::OperationFailed { .. } => "operation_failed",
            GeneralEvent::OperationDetached { .. } => "operation_detached",
            GeneralEvent::RestartRequired { .. } => "restart_required",
        }
    }

    #[must_use]
    pub fn parameters(&self) -> Vec<String> {
        match self {
            GeneralEvent::Warning { message, context } => {
                let mut params = vec![message.clone()];
                if let Some(context) = context {
                    params.push(context.clone());
                }
                params
            }
            GeneralEvent::Error { message, details } => {
                let mut params = vec![message.clone()];
                if let Some(details) = details {
                    params.push(details.clone());
                }
                params
            }
            GeneralEvent::OperationStarted { operation }
            | GeneralEvent::OperationDetached { operation }
            | GeneralEvent::RestartRequired { operation } => vec![operation.clone()],
            GeneralEvent::OperationCompleted { operation, success } => {
                vec![operation.clone(), success.to_string()]
            }
            GeneralEvent::OperationFailed { operation, error } => {
                vec![operation.clone(), error.clone()]
            }
        }
    }
}
