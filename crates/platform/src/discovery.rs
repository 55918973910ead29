//! KDK directory discovery
//!
//! Scans the well-known host directory for KDK-like entries. A missing
//! directory or zero matches is a normal, reportable condition, not an
//! error.

use std::path::{Path, PathBuf};

use sealpatch_errors::Error;

/// List KDK bundles under `dir`, sorted by path.
///
/// An entry qualifies by carrying the `kdk` extension or a `KDK` name
/// substring, matching what the vendor installer produces.
///
/// # Errors
///
/// Returns an error only when the directory exists but cannot be read.
pub async fn discover_kdks(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io_with_path(&e, dir)),
    };

    let mut kdks = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io_with_path(&e, dir))?
    {
        let path = entry.path();
        if is_kdk_like(&path) {
            kdks.push(path);
        }
    }
    kdks.sort();
    Ok(kdks)
}

fn is_kdk_like(path: &Path) -> bool {
    let by_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("kdk"));
    let by_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains("KDK"));
    by_extension || by_name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_directory_is_empty_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("KDKs");
        let kdks = discover_kdks(&absent).await.unwrap();
        assert!(kdks.is_empty());
    }

    #[tokio::test]
    async fn filters_and_sorts_kdk_entries() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "KDK_14.5_23F79.kdk",
            "KDK_13.6_22G120.kdk",
            "notes.txt",
            "SomeKDKBundle",
        ] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }

        let kdks = discover_kdks(dir.path()).await.unwrap();
        let names: Vec<_> = kdks
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["KDK_13.6_22G120.kdk", "KDK_14.5_23F79.kdk", "SomeKDKBundle"]
        );
    }
}
