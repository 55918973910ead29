//! Compiled privileged steps
//!
//! A step is a single structured utility invocation, never free-form
//! shell text. A dedicated renderer in the platform crate turns a step
//! sequence into the exact script handed to the elevation boundary.

use serde::{Deserialize, Serialize};

/// Role of a compiled step within a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Release a transient mount left behind by a previous operation.
    ReleaseStaleMount,
    /// Create the private mount point directory.
    PrepareMountPoint,
    /// Mount the resolved volume (or remount `/` read-write on legacy
    /// systems). Exactly one per compiled sequence.
    ResolveVolume,
    /// Merge the KDK extensions (or full system) tree into the volume.
    MergeKdk,
    /// Create the backup directory once per sequence.
    PrepareBackupDir,
    /// Copy an existing destination into the backup directory.
    BackupExisting,
    /// Install one bundle into its destination directory.
    InstallFile,
    /// Layer one source directory into an existing destination.
    MergeDirectory,
    /// Rebuild the kernel collections on the mounted volume.
    RebuildKernelCache,
    /// Bless the volume into a new sealed boot snapshot.
    SealSnapshot,
    /// Bless the last sealed snapshot as the boot target again.
    RestoreSnapshot,
    /// Release the private mount point at the end of the sequence.
    UnmountVolume,
}

/// One external utility invocation: program name plus argument list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Build an invocation from a program and its arguments.
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// An ordered, atomic privileged step with a human-readable label.
///
/// Sequences are immutable once compiled; the executor never reorders
/// or retries individual steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledStep {
    pub label: String,
    pub kind: StepKind,
    pub invocation: Invocation,
}

impl CompiledStep {
    pub fn new(kind: StepKind, label: impl Into<String>, invocation: Invocation) -> Self {
        Self {
            label: label.into(),
            kind,
            invocation,
        }
    }
}
