//! Resolved root-volume facts

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Facts about the booted root volume, queried live immediately before
/// an operation compiles its steps.
///
/// A context is owned by the operation that created it and is never
/// cached across operations: the host's mount and snapshot state can
/// change between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeContext {
    /// Device identifier of the currently booted root filesystem as
    /// reported for `/` (possibly a sealed snapshot view).
    pub origin_identifier: String,
    /// Device identifier privileged writes must target: the data-bearing
    /// volume backing the sealed snapshot, or the origin itself on
    /// non-sealed systems.
    pub resolved_identifier: String,
    /// Where the writable volume will be reachable once mounted.
    pub mount_path: PathBuf,
    /// Whether `/` is a sealed APFS snapshot.
    pub is_snapshot_sealed: bool,
    /// Major version of the running OS.
    pub os_major_version: u32,
    /// A previous operation left the transient mount point attached;
    /// it must be released before mounting again.
    pub stale_mount_attached: bool,
}

impl VolumeContext {
    /// Sealed-system installs mount the resolved volume at a private
    /// mount point; legacy systems remount `/` read-write in place and
    /// have nothing transient to release afterwards.
    #[must_use]
    pub fn uses_private_mount_point(&self) -> bool {
        self.mount_path != PathBuf::from("/")
    }
}
