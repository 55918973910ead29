//! Core platform abstractions

use crate::elevation::PrivilegedRunner;
use crate::process::{PlatformCommand, ProcessOperations};

/// Main platform abstraction: unprivileged process execution plus the
/// elevated script boundary.
pub struct Platform {
    process_ops: Box<dyn ProcessOperations>,
    privileged: Box<dyn PrivilegedRunner>,
}

impl Platform {
    /// Create a new platform instance with the specified implementations
    #[must_use]
    pub fn new(
        process_ops: Box<dyn ProcessOperations>,
        privileged: Box<dyn PrivilegedRunner>,
    ) -> Self {
        Self {
            process_ops,
            privileged,
        }
    }

    /// Get the current platform (macOS in our case)
    #[must_use]
    pub fn current() -> Self {
        use crate::implementations::macos::{MacOsPrivilegedRunner, MacOsProcessOperations};

        Self::new(
            Box::new(MacOsProcessOperations::new()),
            Box::new(MacOsPrivilegedRunner::new()),
        )
    }

    /// Access process operations
    #[must_use]
    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process_ops
    }

    /// Access the privileged execution boundary
    #[must_use]
    pub fn privileged(&self) -> &dyn PrivilegedRunner {
        &*self.privileged
    }

    /// Convenience method: create a new command builder
    #[must_use]
    pub fn command(&self, program: &str) -> PlatformCommand {
        self.process_ops.create_command(program)
    }
}
