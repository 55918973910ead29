//! macOS process operations implementation

use async_trait::async_trait;
use tokio::process::Command;

use sealpatch_errors::{Error, PlatformError};

use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// macOS implementation of process operations backed by
/// `tokio::process`.
pub struct MacOsProcessOperations;

impl MacOsProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for MacOsProcessOperations {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessOperations for MacOsProcessOperations {
    async fn execute_command(&self, cmd: PlatformCommand) -> Result<CommandOutput, Error> {
        let mut command = Command::new(cmd.program());
        command.args(cmd.get_args());

        if let Some(dir) = cmd.get_current_dir() {
            command.current_dir(dir);
        }

        let output = command.output().await.map_err(|e| {
            Error::from(if e.kind() == std::io::ErrorKind::NotFound {
                PlatformError::CommandNotFound {
                    command: cmd.program().to_string(),
                }
            } else {
                PlatformError::ProcessExecutionFailed {
                    command: cmd.program().to_string(),
                    message: e.to_string(),
                }
            })
        })?;

        tracing::debug!(
            program = cmd.program(),
            code = ?output.status.code(),
            "executed host command"
        );

        Ok(CommandOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_of_a_real_command() {
        let ops = MacOsProcessOperations::new();
        let mut cmd = PlatformCommand::new("echo");
        cmd.arg("hello");

        let output = ops.execute_command(cmd).await.unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout_string().trim(), "hello");
    }

    #[tokio::test]
    async fn missing_binary_is_a_command_not_found_error() {
        let ops = MacOsProcessOperations::new();
        let cmd = PlatformCommand::new("definitely-not-a-real-binary-sealpatch");

        let err = ops.execute_command(cmd).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Platform(PlatformError::CommandNotFound { .. })
        ));
    }
}
