//! Preset definition loading

use std::path::{Path, PathBuf};

use tokio::fs;

use sealpatch_errors::{PresetError, Result};
use sealpatch_events::{AppEvent, EventEmitter, EventSender, PresetEvent};
use sealpatch_types::PresetDefinition;

/// Loads `*.json` preset definitions from a directory.
///
/// An unparsable definition is reported and skipped; it never blocks
/// the definitions that do parse.
pub struct PresetLoader {
    definitions_dir: PathBuf,
    tx: Option<EventSender>,
}

impl EventEmitter for PresetLoader {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl PresetLoader {
    #[must_use]
    pub fn new(definitions_dir: impl Into<PathBuf>, tx: Option<EventSender>) -> Self {
        Self {
            definitions_dir: definitions_dir.into(),
            tx,
        }
    }

    /// Load every parsable definition, sorted by name.
    ///
    /// A missing directory is a normal empty result, not an error.
    ///
    /// # Errors
    ///
    /// Returns `PresetError::DirectoryUnreadable` when the directory
    /// exists but cannot be listed or a definition cannot be read.
    pub async fn load(&self) -> Result<Vec<PresetDefinition>> {
        let mut entries = match fs::read_dir(&self.definitions_dir).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(error) => {
                return Err(PresetError::DirectoryUnreadable {
                    path: self.definitions_dir.display().to_string(),
                    message: error.to_string(),
                }
                .into());
            }
        };

        let mut definitions = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|error| {
            PresetError::DirectoryUnreadable {
                path: self.definitions_dir.display().to_string(),
                message: error.to_string(),
            }
        })? {
            let path = entry.path();
            if path.extension() != Some(std::ffi::OsStr::new("json")) {
                continue;
            }
            if let Some(definition) = self.load_one(&path).await? {
                definitions.push(definition);
            }
        }

        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(definitions)
    }

    async fn load_one(&self, path: &Path) -> Result<Option<PresetDefinition>> {
        let raw = fs::read_to_string(path)
            .await
            .map_err(|error| PresetError::DirectoryUnreadable {
                path: path.display().to_string(),
                message: error.to_string(),
            })?;

        match serde_json::from_str::<PresetDefinition>(&raw) {
            Ok(definition) => {
                self.emit(AppEvent::Preset(PresetEvent::Loaded {
                    name: definition.name.clone(),
                }));
                Ok(Some(definition))
            }
            Err(error) => {
                self.emit(AppEvent::Preset(PresetEvent::DefinitionSkipped {
                    path: path.display().to_string(),
                    reason: error.to_string(),
                }));
                Ok(None)
            }
        }
    }
}
