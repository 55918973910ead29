//! Platform-specific operation errors

use thiserror::Error;

use crate::exec::ExecError;
use crate::resolve::ResolveError;
use crate::UserFacingError;

/// Errors that can occur during platform-specific operations
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("command not found: {command}")]
    CommandNotFound { command: String },

    #[error("process produced undecodable output: {command}")]
    UndecodableOutput { command: String },

    #[error("permission denied: {operation} - {message}")]
    PermissionDenied { operation: String, message: String },
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            PlatformError::ProcessExecutionFailed { .. } => Some("platform.process_failed"),
            PlatformError::CommandNotFound { .. } => Some("platform.command_not_found"),
            PlatformError::UndecodableOutput { .. } => Some("platform.undecodable_output"),
            PlatformError::PermissionDenied { .. } => Some("platform.permission_denied"),
        }
    }
}

impl From<PlatformError> for ResolveError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::ProcessExecutionFailed { command, message } => {
                ResolveError::CommandFailed {
                    command,
                    output: message,
                }
            }
            other => ResolveError::CommandFailed {
                command: String::new(),
                output: other.to_string(),
            },
        }
    }
}

impl From<PlatformError> for ExecError {
    fn from(err: PlatformError) -> Self {
        ExecError::ElevationFailed {
            message: err.to_string(),
        }
    }
}
