//! Root-volume resolution events

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Events emitted while determining the writable root volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VolumeEvent {
    /// Live host queries have started.
    ResolveStarted,

    /// Origin device identifier of `/` was determined.
    OriginIdentified { identifier: String },

    /// The booted root is a sealed snapshot; writes re-target the
    /// data-bearing volume underneath it.
    SnapshotDetected { backing_identifier: String },

    /// Mount strategy chosen for this OS generation.
    MountPlanned {
        mount_path: PathBuf,
        os_major_version: u32,
    },

    /// A transient mount point from an earlier operation is still
    /// attached and will be released first.
    StaleMountDetected { mount_path: PathBuf },
}

impl VolumeEvent {
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        match self {
            VolumeEvent::ResolveStarted => "locating_root_volume",
            VolumeEvent::OriginIdentified { .. } => "origin_identifier",
            VolumeEvent::SnapshotDetected { .. } => "sealed_snapshot_detected",
            VolumeEvent::MountPlanned { .. } => "mount_path_planned",
            VolumeEvent::StaleMountDetected { .. } => "stale_mount_detected",
        }
    }

    #[must_use]
    pub fn parameters(&self) -> Vec<String> {
        match self {
            VolumeEvent::ResolveStarted => Vec::new(),
            VolumeEvent::OriginIdentified { identifier } => vec![identifier.clone()],
            VolumeEvent::SnapshotDetected { backing_identifier } => {
                vec![backing_identifier.clone()]
            }
            VolumeEvent::MountPlanned {
                mount_path,
                os_major_version,
            } => vec![
                mount_path.display().to_string(),
                os_major_version.to_string(),
            ],
            VolumeEvent::StaleMountDetected { mount_path } => {
                vec![mount_path.display().to_string()]
            }
        }
    }
}
