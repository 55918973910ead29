//! Preset loading and expansion events

use serde::{Deserialize, Serialize};

/// Events emitted by the preset loader and expander.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PresetEvent {
    /// A preset definition was loaded from disk.
    Loaded { name: String },

    /// A definition file could not be parsed and was skipped.
    DefinitionSkipped { path: String, reason: String },

    /// The payload directory for a declared system version is missing;
    /// entries for that version are skipped.
    VersionRootMissing { system_version: String },

    /// A declared payload file is missing inside its version directory.
    FileMissing { source: String, system_version: String },

    /// Expansion finished; counts reflect what actually resolved.
    Expanded {
        name: String,
        files: usize,
        merges: usize,
        skipped: usize,
    },
}

impl PresetEvent {
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        match self {
            PresetEvent::Loaded { .. } => "preset_loaded",
            PresetEvent::DefinitionSkipped { .. } => "preset_definition_skipped",
            PresetEvent::VersionRootMissing { .. } => "preset_version_missing",
            PresetEvent::FileMissing { .. } => "preset_file_missing",
            PresetEvent::Expanded { .. } => "preset_expanded",
        }
    }

    #[must_use]
    pub fn parameters(&self) -> Vec<String> {
        match self {
            PresetEvent::Loaded { name } => vec![name.clone()],
            PresetEvent::DefinitionSkipped { path, reason } => vec![path.clone(), reason.clone()],
            PresetEvent::VersionRootMissing { system_version } => vec![system_version.clone()],
            PresetEvent::FileMissing {
                source,
                system_version,
            } => vec![source.clone(), system_version.clone()],
            PresetEvent::Expanded {
                name,
                files,
                merges,
                skipped,
            } => vec![
                name.clone(),
                files.to_string(),
                merges.to_string(),
                skipped.to_string(),
            ],
        }
    }
}
