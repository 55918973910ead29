//! macOS implementations of the platform contracts

pub mod elevation;
pub mod process;

pub use elevation::MacOsPrivilegedRunner;
pub use process::MacOsProcessOperations;
