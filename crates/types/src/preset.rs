//! Declarative patch presets
//!
//! Presets are read-only once loaded; they expand into a concrete
//! `InstallRequest` exactly once per invocation.

use serde::{Deserialize, Serialize};

/// Per-file conflict policy as declared in a preset definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictResolution {
    Overwrite,
    Backup,
    Skip,
    Merge,
}

/// One payload entry of a preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetFile {
    /// Path relative to the version-specific payload directory.
    pub source: String,
    /// Destination path relative to the volume root. Only consulted for
    /// merge-type entries; plain installs derive their destination from
    /// the request flags.
    pub destination: String,
    #[serde(rename = "conflictResolution")]
    pub conflict_resolution: ConflictResolution,
    /// System version whose payload directory holds this file.
    #[serde(rename = "systemVersion")]
    pub system_version: String,
}

/// A named, versioned, declarative bundle of file operations and flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetDefinition {
    pub name: String,
    pub author: String,
    pub description: String,
    pub version: String,
    #[serde(rename = "requiresKDK")]
    pub requires_kdk: bool,
    pub files: Vec<PresetFile>,
    #[serde(rename = "rebuildCache")]
    pub rebuild_cache: bool,
    #[serde(rename = "createSnapshot")]
    pub create_snapshot: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_definition_round_trips_from_json() {
        let raw = r#"{
            "name": "Broadcom WiFi",
            "author": "example",
            "description": "Restores legacy Broadcom WiFi",
            "version": "1.2",
            "requiresKDK": false,
            "files": [
                {
                    "source": "IO80211Family.kext",
                    "destination": "/System/Library/Extensions",
                    "conflictResolution": "backup",
                    "systemVersion": "14.0"
                }
            ],
            "rebuildCache": true,
            "createSnapshot": true
        }"#;

        let preset: PresetDefinition = serde_json::from_str(raw).unwrap();
        assert_eq!(preset.name, "Broadcom WiFi");
        assert_eq!(preset.files.len(), 1);
        assert_eq!(
            preset.files[0].conflict_resolution,
            ConflictResolution::Backup
        );
        assert_eq!(preset.files[0].system_version, "14.0");
        assert!(preset.rebuild_cache);
    }

    #[test]
    fn unknown_conflict_resolution_fails_to_parse() {
        let raw = r#"{"source":"a","destination":"/b","conflictResolution":"rename","systemVersion":"14.0"}"#;
        assert!(serde_json::from_str::<PresetFile>(raw).is_err());
    }
}
