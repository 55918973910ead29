//! Operation-to-step compilation

use std::path::{Path, PathBuf};

use sealpatch_config::constants::{
    BACKUP_DIR_NAME, BLESS, EXTENSIONS_SUBTREE, KMUTIL, MKDIR, MOUNT, PRIVATE_MOUNT_POINT, RSYNC,
    UMOUNT,
};
use sealpatch_errors::Result;
use sealpatch_events::{AppEvent, EventEmitter, EventSender, InstallEvent};
use sealpatch_types::{
    CompiledStep, ConflictDecision, InstallRequest, Invocation, Operation, StepKind, VolumeContext,
};

use crate::policy::{self, PolicyFlags};
use crate::probe::DestinationProbe;

/// Compiles operations into ordered privileged step sequences.
///
/// The output is immutable once compiled: the executor never reorders,
/// retries, or drops individual steps.
pub struct OperationCompiler {
    tx: Option<EventSender>,
    backup_dir: PathBuf,
}

impl EventEmitter for OperationCompiler {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl OperationCompiler {
    #[must_use]
    pub fn new(tx: Option<EventSender>) -> Self {
        let backup_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/var/root"))
            .join("Desktop")
            .join(BACKUP_DIR_NAME);
        Self { tx, backup_dir }
    }

    /// Override the backup directory (tests, non-standard homes).
    #[must_use]
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    /// Compile one operation against freshly resolved volume facts.
    ///
    /// # Errors
    ///
    /// Precondition violations (empty install, KDK merge without a
    /// KDK) are rejected here, before any step exists.
    pub fn compile(
        &self,
        operation: &Operation,
        ctx: &VolumeContext,
        probe: &dyn DestinationProbe,
    ) -> Result<Vec<CompiledStep>> {
        match operation {
            Operation::Install(request) => self.compile_install(request, ctx, probe),
            Operation::MergeKdk { kdk, full_merge } => {
                Ok(self.compile_merge_only(kdk, *full_merge, ctx))
            }
            Operation::RebuildCache => {
                let mut steps = prologue(ctx);
                steps.push(rebuild_cache_step(ctx));
                steps.extend(unmount_epilogue(ctx));
                Ok(steps)
            }
            Operation::CreateSnapshot => {
                let mut steps = prologue(ctx);
                steps.push(seal_snapshot_step(ctx));
                steps.extend(unmount_epilogue(ctx));
                Ok(steps)
            }
            Operation::RestoreSnapshot => {
                let mut steps = prologue(ctx);
                steps.push(restore_snapshot_step(ctx));
                steps.extend(unmount_epilogue(ctx));
                Ok(steps)
            }
        }
    }

    fn compile_install(
        &self,
        request: &InstallRequest,
        ctx: &VolumeContext,
        probe: &dyn DestinationProbe,
    ) -> Result<Vec<CompiledStep>> {
        request.validate()?;
        self.emit(AppEvent::Install(InstallEvent::CompileStarted {
            files: request.files.len(),
            merges: request.merge_operations.len(),
        }));

        let mut steps = prologue(ctx);

        if request.merge_kdk {
            // validate() guarantees a KDK is selected here.
            if let Some(kdk) = &request.selected_kdk {
                self.emit(AppEvent::Install(InstallEvent::KdkMergePlanned {
                    kdk: kdk.display().to_string(),
                    full_merge: false,
                }));
                steps.push(kdk_extensions_merge_step(kdk, ctx));
            }
        }

        let flags = PolicyFlags::from(request);
        let mut backup_dir_prepared = false;
        for file in &request.files {
            self.plan_file(
                file,
                request,
                flags,
                ctx,
                probe,
                &mut backup_dir_prepared,
                &mut steps,
            );
        }

        for merge in &request.merge_operations {
            let live_destination = PathBuf::from(&merge.destination);
            if probe.exists(&live_destination) {
                let name = file_name(&merge.source);
                self.emit(AppEvent::Install(InstallEvent::MergePlanned {
                    name: name.clone(),
                }));
                steps.push(merge_directory_step(&merge.source, &live_destination, ctx));
            } else {
                // One failed merge never aborts the rest of the plan.
                self.emit(AppEvent::Install(InstallEvent::MergeTargetMissing {
                    destination: merge.destination.clone(),
                }));
            }
        }

        if request.rebuild_cache {
            steps.push(rebuild_cache_step(ctx));
        }
        // The final rebuild is unconditional: a cache built from stale
        // content must never be sealed.
        steps.push(rebuild_cache_step(ctx));
        steps.push(seal_snapshot_step(ctx));
        steps.extend(unmount_epilogue(ctx));
        Ok(steps)
    }

    #[allow(clippy::too_many_arguments)]
    fn plan_file(
        &self,
        file: &Path,
        request: &InstallRequest,
        flags: PolicyFlags,
        ctx: &VolumeContext,
        probe: &dyn DestinationProbe,
        backup_dir_prepared: &mut bool,
        steps: &mut Vec<CompiledStep>,
    ) {
        let name = file_name(file);
        let destination_dir = policy::destination_dir(file, request);
        let live_destination = destination_dir.join(&name);
        let decision = policy::decide(flags, probe.exists(&live_destination));
        self.emit(AppEvent::Install(InstallEvent::FilePlanned {
            name: name.clone(),
            decision,
        }));

        let target_dir = on_mount(ctx, &destination_dir);
        match decision {
            ConflictDecision::SkipExisting => {
                self.emit(AppEvent::Install(InstallEvent::FileSkipped { name }));
            }
            ConflictDecision::BackupThenInstall => {
                if !*backup_dir_prepared {
                    steps.push(CompiledStep::new(
                        StepKind::PrepareBackupDir,
                        "Creating backup directory",
                        Invocation::new(MKDIR, ["-p".to_string(), path_str(&self.backup_dir)]),
                    ));
                    *backup_dir_prepared = true;
                }
                steps.push(CompiledStep::new(
                    StepKind::BackupExisting,
                    format!("Backing up existing {name}"),
                    Invocation::new(
                        RSYNC,
                        [
                            "-a".to_string(),
                            path_str(&on_mount(ctx, &live_destination)),
                            path_str(&self.backup_dir.join(&name)),
                        ],
                    ),
                ));
                steps.push(install_file_step(file, &name, &target_dir, false));
            }
            ConflictDecision::Overwrite => {
                steps.push(install_file_step(file, &name, &target_dir, true));
            }
            ConflictDecision::NewInstall => {
                steps.push(install_file_step(file, &name, &target_dir, false));
            }
            // Merge-classified files are routed through merge_operations.
            ConflictDecision::MergeDirectories => {}
        }
    }

    fn compile_merge_only(
        &self,
        kdk: &Path,
        full_merge: bool,
        ctx: &VolumeContext,
    ) -> Vec<CompiledStep> {
        self.emit(AppEvent::Install(InstallEvent::KdkMergePlanned {
            kdk: kdk.display().to_string(),
            full_merge,
        }));

        let mut steps = prologue(ctx);
        if full_merge {
            let source = format!("{}/System/", kdk.display());
            let target = on_mount(ctx, Path::new("/System"));
            steps.push(CompiledStep::new(
                StepKind::MergeKdk,
                "Merging full KDK system tree",
                Invocation::new(RSYNC, ["-r", "-i", "-a", &source, &path_str(&target)]),
            ));
        } else {
            steps.push(kdk_extensions_merge_step(kdk, ctx));
        }
        steps.push(rebuild_cache_step(ctx));
        steps.push(seal_snapshot_step(ctx));
        steps.extend(unmount_epilogue(ctx));
        steps
    }
}

/// Map a volume-root-relative path (leading slash) onto the operation's
/// mount path.
fn on_mount(ctx: &VolumeContext, path: &Path) -> PathBuf {
    let relative = path.strip_prefix("/").unwrap_or(path);
    ctx.mount_path.join(relative)
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| {
            name.to_string_lossy().into_owned()
        })
}

/// Mount the resolved volume. Sealed systems get a private mount point;
/// legacy systems remount the live root read-write in place.
fn prologue(ctx: &VolumeContext) -> Vec<CompiledStep> {
    let mut steps = Vec::new();
    if ctx.stale_mount_attached {
        steps.push(CompiledStep::new(
            StepKind::ReleaseStaleMount,
            "Releasing stale mount point",
            Invocation::new(UMOUNT, [PRIVATE_MOUNT_POINT]),
        ));
    }
    if ctx.uses_private_mount_point() {
        let mount_path = path_str(&ctx.mount_path);
        steps.push(CompiledStep::new(
            StepKind::PrepareMountPoint,
            "Creating private mount point",
            Invocation::new(MKDIR, ["-p".to_string(), mount_path.clone()]),
        ));
        steps.push(CompiledStep::new(
            StepKind::ResolveVolume,
            format!("Mounting {} read-write", ctx.resolved_identifier),
            Invocation::new(
                MOUNT,
                [
                    "-o".to_string(),
                    "nobrowse".to_string(),
                    "-t".to_string(),
                    "apfs".to_string(),
                    format!("/dev/{}", ctx.resolved_identifier),
                    mount_path,
                ],
            ),
        ));
    } else {
        steps.push(CompiledStep::new(
            StepKind::ResolveVolume,
            "Remounting live root read-write",
            Invocation::new(MOUNT, ["-uw", "/"]),
        ));
    }
    steps
}

fn install_file_step(
    source: &Path,
    name: &str,
    target_dir: &Path,
    delete_existing: bool,
) -> CompiledStep {
    let mut args = vec!["-r".to_string(), "-i".to_string(), "-a".to_string()];
    if delete_existing {
        args.push("--delete".to_string());
    }
    args.push(path_str(source));
    args.push(format!("{}/", target_dir.display()));
    CompiledStep::new(
        StepKind::InstallFile,
        format!("Installing {name}"),
        Invocation::new(RSYNC, args),
    )
}

fn merge_directory_step(
    source: &Path,
    live_destination: &Path,
    ctx: &VolumeContext,
) -> CompiledStep {
    let target = on_mount(ctx, live_destination);
    CompiledStep::new(
        StepKind::MergeDirectory,
        format!("Merging {}", file_name(source)),
        Invocation::new(
            RSYNC,
            [
                "-r".to_string(),
                "-i".to_string(),
                "-a".to_string(),
                format!("{}/", source.display()),
                format!("{}/", target.display()),
            ],
        ),
    )
}

fn kdk_extensions_merge_step(kdk: &Path, ctx: &VolumeContext) -> CompiledStep {
    let source = format!("{}/{EXTENSIONS_SUBTREE}/", kdk.display());
    let target = on_mount(ctx, Path::new("/System/Library/Extensions"));
    CompiledStep::new(
        StepKind::MergeKdk,
        "Merging KDK extensions tree",
        Invocation::new(RSYNC, ["-r", "-i", "-a", &source, &path_str(&target)]),
    )
}

fn rebuild_cache_step(ctx: &VolumeContext) -> CompiledStep {
    CompiledStep::new(
        StepKind::RebuildKernelCache,
        "Rebuilding kernel collections",
        Invocation::new(
            KMUTIL,
            [
                "create",
                "--volume-root",
                &path_str(&ctx.mount_path),
                "--update-all",
                "--allow-missing-kdk",
            ],
        ),
    )
}

fn seal_snapshot_step(ctx: &VolumeContext) -> CompiledStep {
    CompiledStep::new(
        StepKind::SealSnapshot,
        "Sealing new boot snapshot",
        Invocation::new(
            BLESS,
            [
                "--mount",
                &path_str(&ctx.mount_path),
                "--bootefi",
                "--create-snapshot",
            ],
        ),
    )
}

fn restore_snapshot_step(ctx: &VolumeContext) -> CompiledStep {
    CompiledStep::new(
        StepKind::RestoreSnapshot,
        "Restoring last sealed snapshot",
        Invocation::new(
            BLESS,
            [
                "--mount",
                &path_str(&ctx.mount_path),
                "--bootefi",
                "--last-sealed-snapshot",
            ],
        ),
    )
}

/// Nothing transient to release on the legacy remount-in-place path.
fn unmount_epilogue(ctx: &VolumeContext) -> Option<CompiledStep> {
    if ctx.uses_private_mount_point() {
        Some(CompiledStep::new(
            StepKind::UnmountVolume,
            "Releasing mount point",
            Invocation::new(UMOUNT, [path_str(&ctx.mount_path)]),
        ))
    } else {
        None
    }
}
