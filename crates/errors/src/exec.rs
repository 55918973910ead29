//! Privileged execution errors

use std::borrow::Cow;

use thiserror::Error;

use crate::UserFacingError;

/// Errors surfaced by the elevated script execution boundary.
///
/// After a non-zero exit from the concatenated script, the filesystem
/// state is explicitly undefined: some steps may have applied, some not.
/// The captured output is carried verbatim for the operator.
#[derive(Debug, Clone, Error)]
pub enum ExecError {
    #[error("privileged script failed: {output}")]
    ScriptFailed { output: String },

    #[error("elevation request was refused or could not be issued: {message}")]
    ElevationFailed { message: String },

    #[error("empty step sequence: refusing to request elevation for nothing")]
    EmptySequence,
}

impl UserFacingError for ExecError {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            ExecError::ScriptFailed { output } => Cow::Borrowed(output),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            ExecError::ScriptFailed { .. } => Some(
                "The volume may be partially patched. Inspect the output, then consider restoring the last sealed snapshot.",
            ),
            ExecError::ElevationFailed { .. } => {
                Some("Administrator credentials are required for root-volume operations.")
            }
            ExecError::EmptySequence => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            ExecError::ScriptFailed { .. } => Some("exec.script_failed"),
            ExecError::ElevationFailed { .. } => Some("exec.elevation_failed"),
            ExecError::EmptySequence => Some("exec.empty_sequence"),
        }
    }
}
