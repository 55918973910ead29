//! Operation requests accepted by the orchestrator

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use sealpatch_errors::{OpsError, Result};

/// A directory-merge entry: source tree layered into a destination
/// directory given relative to the volume root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOperation {
    /// Absolute path of the source directory on the host.
    pub source: PathBuf,
    /// Destination path relative to the mounted volume root, with a
    /// leading slash (e.g. `/System/Library/CoreServices`).
    pub destination: String,
}

/// A request to install extension bundles and optionally merge a KDK
/// tree into the root volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRequest {
    /// Bundles to install, in order.
    pub files: Vec<PathBuf>,
    /// Directory merges to apply after the file installs, in order.
    pub merge_operations: Vec<MergeOperation>,
    /// Replace existing destinations unconditionally.
    pub force_overwrite: bool,
    /// Copy existing destinations aside before installing.
    pub backup_existing: bool,
    /// Request an extra kernel-cache rebuild before the final one.
    pub rebuild_cache: bool,
    /// Route non-framework payloads to /Library/Extensions instead of
    /// /System/Library/Extensions.
    pub install_to_legacy_extensions: bool,
    /// Route `.framework` payloads to PrivateFrameworks instead of
    /// Frameworks.
    pub install_to_private_frameworks: bool,
    /// Selected Kernel Debug Kit root, when one is chosen.
    pub selected_kdk: Option<PathBuf>,
    /// Merge the KDK's extensions tree before installing files.
    pub merge_kdk: bool,
}

impl InstallRequest {
    /// Validate the request invariants before any step is compiled.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::NothingToInstall` when both `files` and
    /// `merge_operations` are empty, and `OpsError::KdkNotSelected`
    /// when a KDK merge is requested without a selected KDK.
    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() && self.merge_operations.is_empty() {
            return Err(OpsError::NothingToInstall.into());
        }
        if self.merge_kdk && self.selected_kdk.is_none() {
            return Err(OpsError::KdkNotSelected.into());
        }
        Ok(())
    }
}

/// The operations the compiler knows how to turn into privileged step
/// sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Install bundles (and optionally merge a KDK) onto the volume.
    Install(InstallRequest),
    /// Merge a KDK tree only; `full_merge` copies the whole `/System`
    /// tree instead of just the extensions subtree.
    MergeKdk { kdk: PathBuf, full_merge: bool },
    /// Rebuild the kernel collections without sealing.
    RebuildCache,
    /// Reseal the volume into a new boot snapshot.
    CreateSnapshot,
    /// Boot from the last sealed snapshot again.
    RestoreSnapshot,
}

impl Operation {
    /// Human-readable operation name used in events and state reporting.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Install(_) => "install",
            Operation::MergeKdk { .. } => "merge-kdk",
            Operation::RebuildCache => "rebuild-cache",
            Operation::CreateSnapshot => "create-snapshot",
            Operation::RestoreSnapshot => "restore-snapshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_is_rejected() {
        let request = InstallRequest::default();
        assert!(request.validate().is_err());
    }

    #[test]
    fn kdk_merge_without_selection_is_rejected() {
        let request = InstallRequest {
            files: vec![PathBuf::from("/tmp/Foo.kext")],
            merge_kdk: true,
            ..InstallRequest::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn merge_only_request_is_valid() {
        let request = InstallRequest {
            merge_operations: vec![MergeOperation {
                source: PathBuf::from("/tmp/payload"),
                destination: "/System/Library/CoreServices".to_string(),
            }],
            ..InstallRequest::default()
        };
        assert!(request.validate().is_ok());
    }
}
