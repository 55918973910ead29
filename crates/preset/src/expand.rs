//! Preset expansion into install requests

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use sealpatch_errors::{OpsError, Result};
use sealpatch_events::{AppEvent, EventEmitter, EventSender, PresetEvent};
use sealpatch_types::{ConflictResolution, InstallRequest, MergeOperation, PresetDefinition};

/// Expands a preset definition against the versioned payload tree.
///
/// Expansion is best-effort by design: payload files missing on disk
/// are reported and dropped, and the remainder still applies. Even an
/// expansion that resolves nothing succeeds here; rejecting an empty
/// request is the caller's precondition check.
pub struct PresetExpander {
    files_root: PathBuf,
    tx: Option<EventSender>,
}

impl EventEmitter for PresetExpander {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl PresetExpander {
    #[must_use]
    pub fn new(files_root: impl Into<PathBuf>, tx: Option<EventSender>) -> Self {
        Self {
            files_root: files_root.into(),
            tx,
        }
    }

    /// Expand `preset` into a concrete [`InstallRequest`].
    ///
    /// # Errors
    ///
    /// Returns `OpsError::PresetRequiresKdk` before touching the disk
    /// when the preset demands a KDK and none is selected.
    pub fn expand(
        &self,
        preset: &PresetDefinition,
        selected_kdk: Option<&Path>,
    ) -> Result<InstallRequest> {
        if preset.requires_kdk && selected_kdk.is_none() {
            return Err(OpsError::PresetRequiresKdk {
                name: preset.name.clone(),
            }
            .into());
        }

        // Request-level flags are the union of what any declared entry
        // asks for, whether or not its payload resolves on disk.
        let force_overwrite = preset
            .files
            .iter()
            .any(|entry| matches!(entry.conflict_resolution, ConflictResolution::Overwrite));
        let backup_existing = preset
            .files
            .iter()
            .any(|entry| matches!(entry.conflict_resolution, ConflictResolution::Backup));

        let mut files = Vec::new();
        let mut merge_operations = Vec::new();
        let mut skipped = 0usize;
        let mut missing_versions: HashSet<&str> = HashSet::new();

        for entry in &preset.files {
            let version_root = self.files_root.join(&entry.system_version);
            if !version_root.is_dir() {
                if missing_versions.insert(&entry.system_version) {
                    self.emit(AppEvent::Preset(PresetEvent::VersionRootMissing {
                        system_version: entry.system_version.clone(),
                    }));
                }
                skipped += 1;
                continue;
            }

            let source = version_root.join(&entry.source);
            if !source.exists() {
                self.emit(AppEvent::Preset(PresetEvent::FileMissing {
                    source: entry.source.clone(),
                    system_version: entry.system_version.clone(),
                }));
                skipped += 1;
                continue;
            }

            match entry.conflict_resolution {
                ConflictResolution::Merge => merge_operations.push(MergeOperation {
                    source,
                    destination: entry.destination.clone(),
                }),
                ConflictResolution::Overwrite
                | ConflictResolution::Backup
                | ConflictResolution::Skip => files.push(source),
            }
        }

        self.emit(AppEvent::Preset(PresetEvent::Expanded {
            name: preset.name.clone(),
            files: files.len(),
            merges: merge_operations.len(),
            skipped,
        }));

        Ok(InstallRequest {
            files,
            merge_operations,
            force_overwrite,
            backup_existing,
            rebuild_cache: preset.rebuild_cache,
            selected_kdk: selected_kdk.map(Path::to_path_buf),
            merge_kdk: preset.requires_kdk,
            ..InstallRequest::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealpatch_types::PresetFile;

    fn definition(files: Vec<PresetFile>, requires_kdk: bool) -> PresetDefinition {
        PresetDefinition {
            name: "Test Preset".to_string(),
            author: "example".to_string(),
            description: String::new(),
            version: "1.0".to_string(),
            requires_kdk,
            files,
            rebuild_cache: true,
            create_snapshot: true,
        }
    }

    fn entry(source: &str, version: &str, resolution: ConflictResolution) -> PresetFile {
        PresetFile {
            source: source.to_string(),
            destination: "/System/Library/CoreServices".to_string(),
            conflict_resolution: resolution,
            system_version: version.to_string(),
        }
    }

    #[test]
    fn entries_route_by_conflict_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let version_root = dir.path().join("14.0");
        std::fs::create_dir_all(version_root.join("Payload.kext")).unwrap();
        std::fs::create_dir_all(version_root.join("Tree")).unwrap();

        let preset = definition(
            vec![
                entry("Payload.kext", "14.0", ConflictResolution::Backup),
                entry("Tree", "14.0", ConflictResolution::Merge),
            ],
            false,
        );
        let request = PresetExpander::new(dir.path(), None)
            .expand(&preset, None)
            .unwrap();

        assert_eq!(request.files.len(), 1);
        assert_eq!(request.merge_operations.len(), 1);
        assert!(request.backup_existing);
        assert!(!request.force_overwrite);
        assert!(request.rebuild_cache);
        assert!(!request.merge_kdk);
    }

    #[test]
    fn missing_payloads_degrade_instead_of_failing() {
        let dir = tempfile::tempdir().unwrap();
        let version_root = dir.path().join("14.0");
        std::fs::create_dir_all(version_root.join("Present.kext")).unwrap();

        let preset = definition(
            vec![
                entry("Present.kext", "14.0", ConflictResolution::Skip),
                entry("Gone.kext", "14.0", ConflictResolution::Overwrite),
                entry("Other.kext", "13.0", ConflictResolution::Overwrite),
            ],
            false,
        );
        let request = PresetExpander::new(dir.path(), None)
            .expand(&preset, None)
            .unwrap();

        assert_eq!(request.files.len(), 1);
        assert!(request.files[0].ends_with("Present.kext"));
    }

    #[test]
    fn declared_policy_flags_survive_missing_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let version_root = dir.path().join("14.0");
        std::fs::create_dir_all(version_root.join("Present.kext")).unwrap();

        let preset = definition(
            vec![
                entry("Present.kext", "14.0", ConflictResolution::Skip),
                entry("Gone.kext", "14.0", ConflictResolution::Overwrite),
                entry("AlsoGone.kext", "14.0", ConflictResolution::Backup),
            ],
            false,
        );
        let request = PresetExpander::new(dir.path(), None)
            .expand(&preset, None)
            .unwrap();

        // The flags reflect what the preset declares, not which
        // payloads happened to resolve.
        assert!(request.force_overwrite);
        assert!(request.backup_existing);
        assert_eq!(request.files.len(), 1);
    }

    #[test]
    fn missing_version_root_expands_to_an_empty_request_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let preset = definition(
            vec![entry("Gone.kext", "14.0", ConflictResolution::Skip)],
            false,
        );
        let request = PresetExpander::new(dir.path(), None)
            .expand(&preset, None)
            .unwrap();
        assert!(request.files.is_empty());
        assert!(request.merge_operations.is_empty());
    }

    #[test]
    fn kdk_requirement_is_checked_before_expansion() {
        let dir = tempfile::tempdir().unwrap();
        let preset = definition(vec![], true);
        let err = PresetExpander::new(dir.path(), None)
            .expand(&preset, None)
            .unwrap_err();
        assert!(matches!(
            err,
            sealpatch_errors::Error::Ops(OpsError::PresetRequiresKdk { .. })
        ));
    }

    #[test]
    fn selected_kdk_flows_into_the_request() {
        let dir = tempfile::tempdir().unwrap();
        let version_root = dir.path().join("14.0");
        std::fs::create_dir_all(version_root.join("Payload.kext")).unwrap();

        let preset = definition(
            vec![entry("Payload.kext", "14.0", ConflictResolution::Skip)],
            true,
        );
        let kdk = PathBuf::from("/Library/Developer/KDKs/KDK_14.5.kdk");
        let request = PresetExpander::new(dir.path(), None)
            .expand(&preset, Some(&kdk))
            .unwrap();
        assert_eq!(request.selected_kdk.as_deref(), Some(kdk.as_path()));
        assert!(request.merge_kdk);
    }
}
