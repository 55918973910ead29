//! Concrete platform implementations

pub mod macos;
