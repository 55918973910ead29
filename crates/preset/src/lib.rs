#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Declarative presets for sealpatch
//!
//! A preset pairs a JSON definition (what to install, with which
//! conflict policy) with a versioned payload tree on disk. Loading and
//! expansion are read-only; a preset expands into an `InstallRequest`
//! and plays no further part in the operation.

mod expand;
mod loader;

pub use expand::PresetExpander;
pub use loader::PresetLoader;
