//! macOS elevation via an interactive administrator prompt
//!
//! The script is wrapped in an AppleScript `do shell script ... with
//! administrator privileges` and handed to `osascript`, which puts up
//! one credential prompt per invocation and runs the whole script as a
//! single elevated unit.

use async_trait::async_trait;
use tokio::process::Command;

use sealpatch_config::constants::OSASCRIPT;
use sealpatch_errors::{Error, ExecError};

use crate::elevation::{PrivilegedRunner, ScriptOutput};

/// Production `PrivilegedRunner` backed by `osascript`.
pub struct MacOsPrivilegedRunner;

impl MacOsPrivilegedRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for MacOsPrivilegedRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Embed a shell script in an AppleScript string literal.
fn applescript_wrapper(script: &str) -> String {
    let escaped = script.replace('\\', "\\\\").replace('"', "\\\"");
    format!("do shell script \"{escaped}\" with administrator privileges")
}

#[async_trait]
impl PrivilegedRunner for MacOsPrivilegedRunner {
    async fn run_script(&self, script: &str) -> Result<ScriptOutput, Error> {
        if script.trim().is_empty() {
            return Err(ExecError::EmptySequence.into());
        }

        let wrapper = applescript_wrapper(script);
        let output = Command::new(OSASCRIPT)
            .arg("-e")
            .arg(&wrapper)
            .output()
            .await
            .map_err(|e| ExecError::ElevationFailed {
                message: e.to_string(),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
        }

        tracing::debug!(code = ?output.status.code(), "privileged script resolved");

        Ok(ScriptOutput {
            success: output.status.success(),
            combined_output: if combined.is_empty() {
                None
            } else {
                Some(combined)
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapper_escapes_embedded_quotes() {
        let wrapped = applescript_wrapper(r#"echo "mount path""#);
        assert_eq!(
            wrapped,
            r#"do shell script "echo \"mount path\"" with administrator privileges"#
        );
    }

    #[test]
    fn wrapper_escapes_backslashes_before_quotes() {
        let wrapped = applescript_wrapper(r"echo a\b");
        assert!(wrapped.contains(r"a\\b"));
    }

    #[tokio::test]
    async fn empty_script_is_rejected_without_prompting() {
        let runner = MacOsPrivilegedRunner::new();
        let err = runner.run_script("   ").await.unwrap_err();
        assert!(matches!(err, Error::Exec(ExecError::EmptySequence)));
    }
}
