#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Step compilation for sealpatch
//!
//! Turns a structured request plus resolved volume facts plus conflict
//! decisions into an ordered, immutable sequence of privileged steps.
//! Compilation is pure given its inputs and the destination probe's
//! answers: nothing here executes anything.

mod compile;
pub mod policy;
mod probe;

pub use compile::OperationCompiler;
pub use policy::{decide, destination_dir, PolicyFlags};
pub use probe::{DestinationProbe, LiveRootProbe};
