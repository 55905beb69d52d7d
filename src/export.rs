//! Settings export and restore: every link and folder plus the search
//! shortcut, as one JSON document.
use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::{
    parent_first, validate_unique_ids, write_json_atomic, Folder, Link, LinkStore,
    RestoreSummary, Result, ShelfError, ShortcutKeys,
};

/// Format version written into exported files.
pub const EXPORT_VERSION: &str = "1.0.0";

/// The exported settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedConfig {
    pub links: Vec<Link>,
    pub folders: Vec<Folder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<ShortcutKeys>,
    #[serde(default)]
    pub version: String,
}

impl ExportedConfig {
    /// Snapshots the whole store.
    pub fn snapshot(store: &LinkStore, shortcut: &ShortcutKeys) -> Result<Self> {
        Ok(Self {
            links: store.get_all_links()?,
            folders: store.get_all_folders()?,
            shortcut: Some(shortcut.clone()),
            version: EXPORT_VERSION.to_string(),
        })
    }

    /// Parses an exported document; `links` and `folders` arrays are required.
    pub fn parse(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let has_array = |key: &str| value.get(key).is_some_and(|v| v.is_array());
        if !has_array("links") || !has_array("folders") {
            return Err(ShelfError::InvalidFormat {
                message: "invalid config file format".to_string(),
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ShelfError::FileNotFound {
                file_path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// `bookmark-config-YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("bookmark-config-{}.json", date.format("%Y-%m-%d"))
}

/// Writes the store and `shortcut` to `path`.
pub fn export_to_file(store: &LinkStore, shortcut: &ShortcutKeys, path: &Path) -> Result<PathBuf> {
    let exported = ExportedConfig::snapshot(store, shortcut)?;
    write_json_atomic(path, &exported)?;
    info!(
        "Exported {} links and {} folders to {}",
        exported.links.len(),
        exported.folders.len(),
        path.display()
    );
    Ok(path.to_path_buf())
}

/// Replaces everything in `store` with the contents of `exported`.
///
/// The document is validated before anything is cleared. The caller is
/// responsible for applying the returned shortcut to its configuration.
pub fn restore(store: &LinkStore, exported: ExportedConfig) -> Result<RestoreSummary> {
    validate_unique_ids(exported.links.iter().map(|l| l.id.as_str()))?;
    validate_unique_ids(exported.folders.iter().map(|f| f.id.as_str()))?;
    let folders = parent_first(exported.folders)?;
    let total_links = exported.links.len();
    let total_folders = folders.len();

    store.clear()?;

    let mut failed = Vec::new();
    for link in exported.links {
        let id = link.id.clone();
        if let Err(e) = store.add_link(link) {
            error!("Failed to restore link {}: {}", id, e);
            failed.push((id, e.to_string()));
        }
    }
    for folder in folders {
        let id = folder.id.clone();
        if let Err(e) = store.add_folder(folder) {
            error!("Failed to restore folder {}: {}", id, e);
            failed.push((id, e.to_string()));
        }
    }

    info!(
        "Restored settings: {} links, {} folders, {} failures",
        total_links,
        total_folders,
        failed.len()
    );
    Ok(RestoreSummary {
        total_links,
        total_folders,
        failed_records: failed,
        shortcut: exported.shortcut,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded_store(dir: &Path) -> LinkStore {
        let store = LinkStore::open_at(dir).unwrap();
        let mut github = Link::new("GitHub".to_string(), "https://github.com".to_string(), vec![]);
        github.notes = Some("code hosting".to_string());
        github.tags = vec!["code".to_string(), "git".to_string()];
        github.use_count = 4;
        let top = Folder::new("Dev".to_string(), None);
        let mut child = Folder::new("Rust".to_string(), Some(top.id.clone()));
        child.links.push(github.id.clone());
        child.order = Some(1);

        store.add_link(github).unwrap();
        store.add_folder(top).unwrap();
        store.add_folder(child).unwrap();
        store
    }

    #[test]
    fn file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 28).unwrap();
        assert_eq!(export_file_name(date), "bookmark-config-2024-10-28.json");
    }

    #[test]
    fn export_then_restore_is_lossless() {
        let source_dir = TempDir::new().unwrap();
        let target_dir = TempDir::new().unwrap();
        let source = seeded_store(source_dir.path());
        let shortcut = ShortcutKeys::new(true, true, false, "F");
        let path = source_dir.path().join("export.json");

        export_to_file(&source, &shortcut, &path).unwrap();
        let exported = ExportedConfig::read(&path).unwrap();
        assert_eq!(exported.version, EXPORT_VERSION);

        let target = LinkStore::open_at(target_dir.path()).unwrap();
        target
            .add_link(Link::new("Stale".to_string(), "https://old.example".to_string(), vec![]))
            .unwrap();
        let summary = restore(&target, exported).unwrap();

        assert!(summary.failed_records.is_empty());
        assert_eq!(summary.shortcut, Some(shortcut));
        assert_eq!(target.get_all_links().unwrap(), source.get_all_links().unwrap());
        assert_eq!(target.get_all_folders().unwrap(), source.get_all_folders().unwrap());
    }

    #[test]
    fn documents_without_links_or_folders_are_rejected() {
        let err = ExportedConfig::parse(r#"{"links": []}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid format: invalid config file format");
        assert!(ExportedConfig::parse(r#"{"links": {}, "folders": []}"#).is_err());
    }

    #[test]
    fn restore_keeps_data_when_folders_are_inconsistent() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(dir.path());
        let mut orphan = Folder::new("Orphan".to_string(), None);
        orphan.parent_id = Some("missing".to_string());
        let exported = ExportedConfig {
            links: Vec::new(),
            folders: vec![orphan],
            shortcut: None,
            version: EXPORT_VERSION.to_string(),
        };

        assert!(restore(&store, exported).is_err());
        assert_eq!(store.get_all_links().unwrap().len(), 1);
    }

    #[test]
    fn restore_keeps_data_when_ids_are_invalid() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(dir.path());
        let mut bad = Link::new("Bad".to_string(), "https://bad.example".to_string(), vec![]);
        bad.id = "bad.id".to_string();
        let exported = ExportedConfig {
            links: vec![bad],
            folders: Vec::new(),
            shortcut: None,
            version: EXPORT_VERSION.to_string(),
        };

        assert!(matches!(
            restore(&store, exported),
            Err(ShelfError::InvalidFormat { .. })
        ));
        assert_eq!(store.get_all_links().unwrap().len(), 1);
        assert_eq!(store.get_all_folders().unwrap().len(), 2);
    }

    #[test]
    fn restore_keeps_data_when_ids_repeat() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(dir.path());
        let link = Link::new("Twice".to_string(), "https://twice.example".to_string(), vec![]);
        let exported = ExportedConfig {
            links: vec![link.clone(), link],
            folders: Vec::new(),
            shortcut: None,
            version: EXPORT_VERSION.to_string(),
        };

        assert!(restore(&store, exported).is_err());
        assert_eq!(store.get_all_links().unwrap().len(), 1);
    }

    #[test]
    fn shortcut_is_optional() {
        let exported = ExportedConfig::parse(r#"{"links": [], "folders": []}"#).unwrap();
        assert!(exported.shortcut.is_none());
        assert!(exported.version.is_empty());
    }
}
