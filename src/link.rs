//! Core record types for the shelfmark application.
//!
//! A [`Link`] is a stored bookmark. Timestamps are kept as `DateTime<Utc>` in
//! memory and serialized as epoch milliseconds, so records round-trip through
//! exported settings files unchanged.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{new_id, now_millis};

/// Represents a single bookmark in our system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Unique identifier for the link
    pub id: String,
    /// Display name
    pub name: String,
    /// Target URL
    pub url: String,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Tags for organization. Not capped here.
    #[serde(default)]
    pub tags: Vec<String>,
    /// When the link was created
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// How many times the link has been opened
    #[serde(default)]
    pub use_count: u64,
}

impl Link {
    /// Creates a new link with a fresh id. An empty name falls back to the url.
    pub fn new(name: String, url: String, tags: Vec<String>) -> Self {
        let name = if name.trim().is_empty() {
            url.clone()
        } else {
            name
        };

        Link {
            id: new_id(),
            name,
            url,
            notes: None,
            tags,
            created_at: now_millis(),
            use_count: 0,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A partial update to a [`Link`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkChanges {
    pub name: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub use_count: Option<u64>,
}

impl LinkChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.url.is_none()
            && self.notes.is_none()
            && self.tags.is_none()
            && self.use_count.is_none()
    }

    pub fn apply(self, link: &mut Link) {
        if let Some(name) = self.name {
            link.name = name;
        }
        if let Some(url) = self.url {
            link.url = url;
        }
        if let Some(notes) = self.notes {
            link.notes = Some(notes);
        }
        if let Some(tags) = self.tags {
            link.tags = tags;
        }
        if let Some(use_count) = self.use_count {
            link.use_count = use_count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_link_defaults() {
        let link = Link::new(
            "GitHub".to_string(),
            "https://github.com".to_string(),
            vec!["code".to_string()],
        );

        assert!(!link.id.is_empty());
        assert_eq!(link.name, "GitHub");
        assert_eq!(link.use_count, 0);
        assert!(link.notes.is_none());
    }

    #[test]
    fn empty_name_falls_back_to_url() {
        let link = Link::new(String::new(), "https://docs.rs".to_string(), vec![]);
        assert_eq!(link.name, "https://docs.rs");
    }

    #[test]
    fn serializes_camel_case_with_epoch_millis() {
        let json = r#"{
            "id": "abc",
            "name": "Docs",
            "url": "https://docs.io",
            "tags": ["git"],
            "createdAt": 1698508200000,
            "useCount": 3
        }"#;

        let link: Link = serde_json::from_str(json).unwrap();
        assert_eq!(link.created_at.timestamp_millis(), 1698508200000);
        assert_eq!(link.use_count, 3);
        assert!(link.notes.is_none());

        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["createdAt"], 1698508200000i64);
        assert_eq!(value["useCount"], 3);
        assert!(value.get("notes").is_none());
    }

    #[test]
    fn changes_only_touch_given_fields() {
        let mut link = Link::new("Old".to_string(), "https://a.com".to_string(), vec![]);
        let changes = LinkChanges {
            name: Some("New".to_string()),
            notes: Some("read later".to_string()),
            ..Default::default()
        };

        changes.apply(&mut link);

        assert_eq!(link.name, "New");
        assert_eq!(link.url, "https://a.com");
        assert_eq!(link.notes.as_deref(), Some("read later"));
    }
}
