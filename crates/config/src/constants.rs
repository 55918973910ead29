//! Centralized, non-configurable host paths and utility names
//!
//! These are deliberately not exposed via TOML configuration: the
//! privileged scripts are reviewed against these exact locations and
//! binaries.

/// Well-known directory scanned for Kernel Debug Kits.
pub const KDK_DIRECTORY: &str = "/Library/Developer/KDKs";

/// Private mount point used on sealed-volume systems.
pub const PRIVATE_MOUNT_POINT: &str = "/System/Volumes/Update/mnt1";

/// First OS major version with a sealed system volume (Big Sur).
pub const SEALED_VOLUME_OS_MAJOR: u32 = 11;

/// Backup directory name created on the operator's desktop.
pub const BACKUP_DIR_NAME: &str = "SealPatchBak";

/// Extensions subtree, relative to a KDK or volume root.
pub const EXTENSIONS_SUBTREE: &str = "System/Library/Extensions";

// External utilities invoked through the privileged boundary.
pub const DISKUTIL: &str = "diskutil";
pub const SW_VERS: &str = "sw_vers";
pub const MOUNT: &str = "mount";
pub const UMOUNT: &str = "umount";
pub const MKDIR: &str = "mkdir";
pub const RSYNC: &str = "rsync";
pub const KMUTIL: &str = "kmutil";
pub const BLESS: &str = "bless";
pub const OSASCRIPT: &str = "osascript";
