//! Preset loading and expansion errors

use std::borrow::Cow;

use thiserror::Error;

use crate::UserFacingError;

/// Errors from the declarative preset layer.
///
/// Missing payload files are deliberately *not* represented here: they
/// degrade the expanded request with a warning instead of failing it.
#[derive(Debug, Clone, Error)]
pub enum PresetError {
    #[error("preset definition could not be parsed: {message}")]
    ParseError { message: String },

    #[error("preset directory {path} is not readable: {message}")]
    DirectoryUnreadable { path: String, message: String },

    #[error("preset {name} expanded to an empty request: no payload files were found")]
    NothingExpanded { name: String },
}

impl UserFacingError for PresetError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            PresetError::ParseError { .. } => Some("Validate the preset JSON against the documented schema."),
            PresetError::DirectoryUnreadable { .. } => None,
            PresetError::NothingExpanded { .. } => {
                Some("Check that the versioned payload directories referenced by the preset exist.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, PresetError::DirectoryUnreadable { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            PresetError::ParseError { .. } => Some("preset.parse_error"),
            PresetError::DirectoryUnreadable { .. } => Some("preset.dir_unreadable"),
            PresetError::NothingExpanded { .. } => Some("preset.nothing_expanded"),
        }
    }
}
