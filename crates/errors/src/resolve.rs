//! Root-volume resolution errors

use std::borrow::Cow;

use thiserror::Error;

use crate::UserFacingError;

/// Errors raised while determining the writable root volume.
///
/// Resolution failures are fatal to the operation: no privileged steps
/// are compiled or attempted after one of these.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("volume query failed: {command} - {output}")]
    CommandFailed { command: String, output: String },

    #[error("device identifier missing from diskutil output")]
    MissingDeviceIdentifier,

    #[error("no backing volume found for snapshot device {origin}")]
    BackingVolumeNotFound { origin: String },

    #[error("unparsable OS version: {raw}")]
    UnparsableOsVersion { raw: String },
}

impl UserFacingError for ResolveError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            ResolveError::CommandFailed { .. } => {
                Some("Check that diskutil and sw_vers are available on this system.")
            }
            ResolveError::BackingVolumeNotFound { .. } => {
                Some("The booted snapshot has no visible data volume; verify the disk layout with `diskutil list`.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            ResolveError::CommandFailed { .. } => Some("resolve.command_failed"),
            ResolveError::MissingDeviceIdentifier => Some("resolve.missing_identifier"),
            ResolveError::BackingVolumeNotFound { .. } => Some("resolve.no_backing_volume"),
            ResolveError::UnparsableOsVersion { .. } => Some("resolve.bad_os_version"),
        }
    }
}
