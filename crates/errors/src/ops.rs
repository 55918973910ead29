//! Orchestration and precondition errors

use std::borrow::Cow;

use thiserror::Error;

use crate::UserFacingError;

/// Errors raised before any privileged step is compiled or dispatched.
#[derive(Debug, Clone, Error)]
pub enum OpsError {
    #[error("nothing to install: no files or merge operations selected")]
    NothingToInstall,

    #[error("KDK merge requested but no KDK is selected")]
    KdkNotSelected,

    #[error("preset {name} requires a KDK but none is selected")]
    PresetRequiresKdk { name: String },

    #[error("another privileged operation is already in progress: {current}")]
    OperationInProgress { current: String },

    #[error("invalid operation state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            OpsError::NothingToInstall => Some("Select at least one bundle or merge entry."),
            OpsError::KdkNotSelected | OpsError::PresetRequiresKdk { .. } => {
                Some("Pick a KDK from /Library/Developer/KDKs first.")
            }
            OpsError::OperationInProgress { .. } => {
                Some("Wait for the running operation to finish; privileged scripts cannot be raced against the same volume.")
            }
            OpsError::InvalidStateTransition { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, OpsError::OperationInProgress { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            OpsError::NothingToInstall => Some("ops.nothing_to_install"),
            OpsError::KdkNotSelected => Some("ops.kdk_not_selected"),
            OpsError::PresetRequiresKdk { .. } => Some("ops.preset_requires_kdk"),
            OpsError::OperationInProgress { .. } => Some("ops.operation_in_progress"),
            OpsError::InvalidStateTransition { .. } => Some("ops.invalid_transition"),
        }
    }
}
