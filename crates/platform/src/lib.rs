#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform abstraction layer for sealpatch
//!
//! Wraps every touchpoint with the host behind traits: unprivileged
//! process execution (volume queries), the elevated script boundary,
//! the structured-step shell renderer, and KDK directory discovery.
//! Library crates depend on these contracts, never on how elevation is
//! obtained.

pub mod core;
pub mod discovery;
pub mod elevation;
pub mod implementations;
pub mod process;
pub mod script;

pub use core::Platform;
pub use discovery::discover_kdks;
pub use elevation::{PrivilegedRunner, ScriptOutput};
pub use process::{CommandOutput, PlatformCommand, ProcessOperations};
pub use script::{render_script, sh_quote};
