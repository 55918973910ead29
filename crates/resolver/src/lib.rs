#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Root-volume resolution for sealpatch
//!
//! Determines the device identifier and mount path privileged steps
//! must target, accounting for sealed snapshots and OS generations.
//! Resolution runs once per operation, immediately before compilation,
//! using only unprivileged host queries; nothing is cached across
//! operations because mount and snapshot state can change between runs.

mod parse;

pub use parse::{extract_device_identifier, parse_backing_identifier, parse_os_major};

use std::path::PathBuf;

use sealpatch_config::constants::{
    DISKUTIL, MOUNT, PRIVATE_MOUNT_POINT, SEALED_VOLUME_OS_MAJOR, SW_VERS,
};
use sealpatch_errors::{Error, ResolveError};
use sealpatch_events::{AppEvent, EventEmitter, EventSender, VolumeEvent};
use sealpatch_platform::{PlatformCommand, ProcessOperations};
use sealpatch_types::VolumeContext;

/// Resolves the writable root volume from live host state.
pub struct VolumeResolver<'a> {
    process: &'a dyn ProcessOperations,
    tx: Option<EventSender>,
}

impl EventEmitter for VolumeResolver<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl<'a> VolumeResolver<'a> {
    #[must_use]
    pub fn new(process: &'a dyn ProcessOperations, tx: Option<EventSender>) -> Self {
        Self { process, tx }
    }

    /// Query the host and build a fresh `VolumeContext`.
    ///
    /// # Errors
    ///
    /// Any host query exiting non-zero aborts resolution with the raw
    /// diagnostic text; volume state is not assumed transient, so there
    /// is no retry.
    pub async fn resolve(&self) -> Result<VolumeContext, Error> {
        self.emit(AppEvent::Volume(VolumeEvent::ResolveStarted));

        let info = self.query(DISKUTIL, &["info", "-plist", "/"]).await?;
        let origin = extract_device_identifier(&info)
            .ok_or(Error::Resolve(ResolveError::MissingDeviceIdentifier))?;
        self.emit(AppEvent::Volume(VolumeEvent::OriginIdentified {
            identifier: origin.clone(),
        }));

        // Sealed systems boot a read-only snapshot view; writes must
        // target the data-bearing volume one step above it in the
        // listing.
        let is_snapshot_sealed = info.contains("APFSSnapshot");
        let resolved = if is_snapshot_sealed {
            let listing = self.query(DISKUTIL, &["list"]).await?;
            let backing = parse_backing_identifier(&listing, &origin).ok_or_else(|| {
                Error::Resolve(ResolveError::BackingVolumeNotFound {
                    origin: origin.clone(),
                })
            })?;
            self.emit(AppEvent::Volume(VolumeEvent::SnapshotDetected {
                backing_identifier: backing.clone(),
            }));
            backing
        } else {
            origin.clone()
        };

        // A leftover transient mount must never be trusted as current
        // state; it is released as the first privileged step.
        let mounts = self.query(MOUNT, &[]).await?;
        let stale_mount_attached = mounts.contains(PRIVATE_MOUNT_POINT);
        if stale_mount_attached {
            self.emit(AppEvent::Volume(VolumeEvent::StaleMountDetected {
                mount_path: PathBuf::from(PRIVATE_MOUNT_POINT),
            }));
        }

        let version = self.query(SW_VERS, &["-productVersion"]).await?;
        let os_major_version = parse_os_major(&version)?;

        let mount_path = if os_major_version >= SEALED_VOLUME_OS_MAJOR {
            PathBuf::from(PRIVATE_MOUNT_POINT)
        } else {
            PathBuf::from("/")
        };
        self.emit(AppEvent::Volume(VolumeEvent::MountPlanned {
            mount_path: mount_path.clone(),
            os_major_version,
        }));

        Ok(VolumeContext {
            origin_identifier: origin,
            resolved_identifier: resolved,
            mount_path,
            is_snapshot_sealed,
            os_major_version,
            stale_mount_attached,
        })
    }

    async fn query(&self, program: &str, args: &[&str]) -> Result<String, Error> {
        let mut cmd = PlatformCommand::new(program);
        cmd.args(args);
        let output = self.process.execute_command(cmd).await?;
        if output.status.success() {
            Ok(output.stdout_string())
        } else {
            Err(Error::Resolve(ResolveError::CommandFailed {
                command: std::iter::once(program)
                    .chain(args.iter().copied())
                    .collect::<Vec<_>>()
                    .join(" "),
                output: output.combined_string(),
            }))
        }
    }
}
