use std::{
    collections::HashSet,
    fs,
    io::Write,
    path::Path,
};

use chrono::{DateTime, SubsecRound, Utc};
use log::{debug, error, trace};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::{Result, ShelfError};

/// Generates a fresh, collision-resistant record id.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Current time truncated to the millisecond precision records are stored with.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Record ids double as file names, so only a conservative alphabet is allowed.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(ShelfError::InvalidFormat {
            message: "record id must not be empty".to_string(),
        });
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ShelfError::InvalidFormat {
            message: format!("record id contains unsupported characters: {}", id),
        });
    }
    Ok(())
}

/// Validates each id and rejects any id seen twice.
pub fn validate_unique_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        validate_id(id)?;
        if !seen.insert(id) {
            return Err(ShelfError::InvalidFormat {
                message: format!("duplicate record id: {}", id),
            });
        }
    }
    Ok(())
}

/// Serializes `value` as pretty JSON and moves it into place atomically.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    if !dir.exists() {
        debug!("Creating parent directory: {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| {
            error!("Failed to create directory {}: {}", dir.display(), e);
            ShelfError::Io(e)
        })?;
    }

    debug!("Creating temporary file in directory: {}", dir.display());
    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
        error!("Failed to create temporary file: {}", e);
        ShelfError::Io(e)
    })?;

    trace!("Serializing record to JSON");
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        error!("Failed to serialize record: {}", e);
        ShelfError::Serialization(e)
    })?;

    temp_file.write_all(json.as_bytes()).map_err(|e| {
        error!("Failed to write to temporary file: {}", e);
        ShelfError::Io(e)
    })?;
    temp_file.flush().map_err(|e| {
        error!("Failed to flush temporary file: {}", e);
        ShelfError::Io(e)
    })?;

    trace!("Performing atomic move of temporary file to {}", path.display());
    temp_file.persist(path).map_err(|e| {
        error!("Failed to persist file {}: {}", path.display(), e.error);
        ShelfError::Io(e.error)
    })?;

    Ok(())
}

/// Loads a single JSON record from disk.
pub fn load_record_from_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Loading record from file: {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to open record file {}: {}", path.display(), e);
        ShelfError::Io(e)
    })?;

    let record = serde_json::from_str(&content)?;
    trace!("Successfully loaded record from {}", path.display());
    Ok(record)
}

// Helper method for parsing tags
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
    }

    #[test]
    fn ids_are_unique_and_valid() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert!(validate_id(&a).is_ok());
    }

    #[test]
    fn unique_ids_reject_repeats_and_bad_characters() {
        assert!(validate_unique_ids(["a", "b-c", "d_e"]).is_ok());
        assert!(validate_unique_ids(["a", "b", "a"]).is_err());
        assert!(validate_unique_ids(["ok", "bad.id"]).is_err());
    }

    #[test]
    fn rejects_path_like_ids() {
        assert!(validate_id("").is_err());
        assert!(validate_id("../etc").is_err());
        assert!(validate_id("V1StGXR8_Z5jdHi6B-myT").is_ok());
    }

    #[test]
    fn atomic_write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("sample.json");
        let sample = Sample {
            name: "shelf".to_string(),
        };

        write_json_atomic(&path, &sample).unwrap();
        let loaded: Sample = load_record_from_file(&path).unwrap();
        assert_eq!(loaded, sample);
    }

    #[test]
    fn parse_tags_trims_and_drops_empty() {
        assert_eq!(
            parse_tags(Some(" rust, ,docs ".to_string())),
            vec!["rust".to_string(), "docs".to_string()]
        );
        assert!(parse_tags(None).is_empty());
    }
}
