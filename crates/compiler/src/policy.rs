//! Conflict-resolution policy
//!
//! Pure functions, no I/O: the decision for a file follows from the
//! request's global flags and whether the destination currently exists.
//! Merge-routed entries never come through here; they are always
//! `MergeDirectories`.

use std::path::{Path, PathBuf};

use sealpatch_types::{ConflictDecision, InstallRequest};

/// The request-level flags the policy consults.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyFlags {
    pub force_overwrite: bool,
    pub backup_existing: bool,
}

impl From<&InstallRequest> for PolicyFlags {
    fn from(request: &InstallRequest) -> Self {
        Self {
            force_overwrite: request.force_overwrite,
            backup_existing: request.backup_existing,
        }
    }
}

/// Decide what happens to one file, in priority order: force wins, an
/// absent destination is a plain new install, backup comes before skip.
#[must_use]
pub fn decide(flags: PolicyFlags, destination_exists: bool) -> ConflictDecision {
    if flags.force_overwrite {
        ConflictDecision::Overwrite
    } else if !destination_exists {
        ConflictDecision::NewInstall
    } else if flags.backup_existing {
        ConflictDecision::BackupThenInstall
    } else {
        ConflictDecision::SkipExisting
    }
}

/// Destination directory for a payload, relative to the volume root
/// (leading slash). `.framework` payloads route to a frameworks
/// directory; everything else to an extensions directory.
#[must_use]
pub fn destination_dir(file: &Path, request: &InstallRequest) -> PathBuf {
    let is_framework = file
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("framework"));

    let dir = if is_framework {
        if request.install_to_private_frameworks {
            "/System/Library/PrivateFrameworks"
        } else {
            "/System/Library/Frameworks"
        }
    } else if request.install_to_legacy_extensions {
        "/Library/Extensions"
    } else {
        "/System/Library/Extensions"
    };
    PathBuf::from(dir)
}
