//! Destination existence probing
//!
//! Structured steps carry no shell conditionals, so destination
//! existence is probed at compile time against the live (sealed,
//! read-only) root view, which mirrors the data volume for the
//! destinations involved.

use std::path::Path;

/// Answers "does this destination exist right now" for the compiler.
pub trait DestinationProbe: Send + Sync {
    /// `live_path` is absolute on the booted root view (`/System/...`),
    /// not under the transient mount point.
    fn exists(&self, live_path: &Path) -> bool;
}

/// Production probe over the booted root filesystem.
pub struct LiveRootProbe;

impl DestinationProbe for LiveRootProbe {
    fn exists(&self, live_path: &Path) -> bool {
        live_path.exists()
    }
}
