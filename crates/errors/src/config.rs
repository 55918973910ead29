//! Configuration errors

use thiserror::Error;

use crate::UserFacingError;

/// Errors from loading operator configuration overrides.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("invalid config: {message}")]
    Invalid { message: String },

    #[error("config file {path} is not readable: {message}")]
    Unreadable { path: String, message: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("Check the sealpatch configuration file.")
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            ConfigError::Invalid { .. } => Some("config.invalid"),
            ConfigError::Unreadable { .. } => Some("config.unreadable"),
        }
    }
}
