//! Privileged execution boundary
//!
//! One opaque "run this script with administrator rights" call. The
//! orchestrator depends only on this contract, not on how elevation is
//! obtained, and issues exactly one elevation request per operation.

use async_trait::async_trait;

use sealpatch_errors::Error;

/// Result of an elevated script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutput {
    /// Whether the script (joined with hard ANDs) exited zero.
    pub success: bool,
    /// Combined stdout/stderr, when any was produced.
    pub combined_output: Option<String>,
}

/// The elevated execution contract.
///
/// The dispatched script is not killable mid-flight: it runs to
/// completion or native failure. Callers must treat cancellation as
/// "stop tracking", never "abort".
#[async_trait]
pub trait PrivilegedRunner: Send + Sync {
    /// Run the rendered script with administrator rights and capture
    /// its combined output.
    async fn run_script(&self, script: &str) -> Result<ScriptOutput, Error>;
}
