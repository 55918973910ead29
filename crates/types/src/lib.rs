#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the sealpatch orchestrator
//!
//! This crate provides the data model shared across the system: install
//! requests, resolved volume facts, compiled privileged steps, operation
//! outcomes, and declarative preset definitions.

pub mod outcome;
pub mod preset;
pub mod request;
pub mod step;
pub mod volume;

// Re-export commonly used types
pub use outcome::OperationOutcome;
pub use preset::{ConflictResolution, PresetDefinition, PresetFile};
pub use request::{InstallRequest, MergeOperation, Operation};
pub use step::{CompiledStep, Invocation, StepKind};
pub use uuid::Uuid;
pub use volume::VolumeContext;

use serde::{Deserialize, Serialize};

/// Per-file conflict decision derived from request flags and the
/// destination's current existence.
///
/// `NewInstall` and `Overwrite` produce the same write step; they are
/// distinguished so the event log can report "new install" separately
/// from a forced replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictDecision {
    /// Destination replaced unconditionally, recursively.
    Overwrite,
    /// Destination absent; plain install.
    NewInstall,
    /// Existing destination copied to the backup directory first.
    BackupThenInstall,
    /// Existing destination left untouched.
    SkipExisting,
    /// Non-destructive recursive merge into an existing directory.
    MergeDirectories,
}

impl std::fmt::Display for ConflictDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overwrite => write!(f, "overwrite"),
            Self::NewInstall => write!(f, "new install"),
            Self::BackupThenInstall => write!(f, "backup then install"),
            Self::SkipExisting => write!(f, "skip existing"),
            Self::MergeDirectories => write!(f, "merge directories"),
        }
    }
}
