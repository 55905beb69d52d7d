//! Native browser bookmark trees and the sources they are read from.
//!
//! Two on-disk shapes are supported:
//!
//! * the shape returned by the browser bookmarks API (`title`, `url`,
//!   `children`, `dateAdded` in epoch milliseconds), as a single node or an
//!   array of nodes;
//! * Chrome/Chromium's profile `Bookmarks` file (`roots`, `type`, `name`,
//!   `date_added` in microseconds since 1601-01-01).
//!
//! Both are turned into [`BookmarkNode`] trees. The profile file is wrapped in
//! a single untitled root so it looks exactly like the API output.
use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use directories::BaseDirs;
use log::{debug, info};
use serde::Deserialize;

use crate::{Result, ShelfError};

/// Milliseconds between 1601-01-01 and the Unix epoch.
const WEBKIT_EPOCH_OFFSET_MS: i64 = 11_644_473_600_000;

/// A node of a native bookmark tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawNode")]
pub enum BookmarkNode {
    /// A container. Roots usually carry no title.
    Folder {
        title: Option<String>,
        date_added: Option<DateTime<Utc>>,
        children: Vec<BookmarkNode>,
    },
    /// A bookmark leaf.
    Bookmark {
        title: String,
        url: String,
        date_added: Option<DateTime<Utc>>,
    },
}

impl BookmarkNode {
    pub fn folder(title: impl Into<String>, children: Vec<BookmarkNode>) -> Self {
        BookmarkNode::Folder {
            title: Some(title.into()),
            date_added: None,
            children,
        }
    }

    /// An untitled container, as produced for the browser's top-level root.
    pub fn root(children: Vec<BookmarkNode>) -> Self {
        BookmarkNode::Folder {
            title: None,
            date_added: None,
            children,
        }
    }

    pub fn bookmark(title: impl Into<String>, url: impl Into<String>) -> Self {
        BookmarkNode::Bookmark {
            title: title.into(),
            url: url.into(),
            date_added: None,
        }
    }

    pub fn with_date_added(mut self, when: DateTime<Utc>) -> Self {
        match &mut self {
            BookmarkNode::Folder { date_added, .. } | BookmarkNode::Bookmark { date_added, .. } => {
                *date_added = Some(when)
            }
        }
        self
    }

    /// Untitled folders are containers only and never become visible folders.
    pub fn is_transparent(&self) -> bool {
        match self {
            BookmarkNode::Folder { title, .. } => title.as_deref().map_or(true, str::is_empty),
            BookmarkNode::Bookmark { .. } => false,
        }
    }

    /// Counts `(bookmarks, titled folders)` in this subtree.
    pub fn count(&self) -> (usize, usize) {
        match self {
            BookmarkNode::Bookmark { .. } => (1, 0),
            BookmarkNode::Folder { children, .. } => {
                let own = usize::from(!self.is_transparent());
                children.iter().fold((0, own), |(links, folders), child| {
                    let (l, f) = child.count();
                    (links + l, folders + f)
                })
            }
        }
    }
}

/// Wire shape of the browser bookmarks API.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    children: Vec<RawNode>,
    date_added: Option<f64>,
}

impl From<RawNode> for BookmarkNode {
    fn from(raw: RawNode) -> Self {
        let date_added = raw
            .date_added
            .and_then(|ms| DateTime::from_timestamp_millis(ms as i64));

        match raw.url.filter(|url| !url.is_empty()) {
            Some(url) => BookmarkNode::Bookmark {
                title: raw.title.unwrap_or_default(),
                url,
                date_added,
            },
            None => BookmarkNode::Folder {
                title: raw.title,
                date_added,
                children: raw.children.into_iter().map(BookmarkNode::from).collect(),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TreeShape {
    Many(Vec<BookmarkNode>),
    One(BookmarkNode),
}

/// Chrome profile `Bookmarks` file layout.
#[derive(Deserialize)]
struct ChromeFile {
    roots: ChromeRoots,
}

#[derive(Deserialize)]
struct ChromeRoots {
    bookmark_bar: Option<ChromeNode>,
    other: Option<ChromeNode>,
    synced: Option<ChromeNode>,
}

#[derive(Deserialize)]
struct ChromeNode {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    url: Option<String>,
    date_added: Option<String>,
    #[serde(default)]
    children: Vec<ChromeNode>,
}

impl From<ChromeNode> for BookmarkNode {
    fn from(node: ChromeNode) -> Self {
        let date_added = node.date_added.as_deref().and_then(webkit_timestamp);
        match (node.kind.as_str(), node.url) {
            ("url", Some(url)) => BookmarkNode::Bookmark {
                title: node.name,
                url,
                date_added,
            },
            _ => BookmarkNode::Folder {
                title: Some(node.name),
                date_added,
                children: node.children.into_iter().map(BookmarkNode::from).collect(),
            },
        }
    }
}

/// Converts Chrome's "microseconds since 1601" string into a UTC timestamp.
fn webkit_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let micros: i64 = value.trim().parse().ok()?;
    if micros <= 0 {
        return None;
    }
    DateTime::from_timestamp_millis(micros / 1000 - WEBKIT_EPOCH_OFFSET_MS)
}

/// Something that can hand over a complete native bookmark tree.
pub trait BookmarkSource {
    /// Human-readable description used in logs.
    fn describe(&self) -> String;

    /// Returns the whole tree in one call.
    fn fetch_tree(&self) -> Result<Vec<BookmarkNode>>;
}

impl BookmarkSource for Vec<BookmarkNode> {
    fn describe(&self) -> String {
        format!("in-memory tree with {} root node(s)", self.len())
    }

    fn fetch_tree(&self) -> Result<Vec<BookmarkNode>> {
        Ok(self.clone())
    }
}

fn read_source_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ShelfError::FileNotFound {
            file_path: path.display().to_string(),
        });
    }
    debug!("Reading bookmark source: {}", path.display());
    Ok(fs::read_to_string(path)?)
}

/// A JSON file holding a tree in the browser bookmarks API shape.
#[derive(Debug, Clone)]
pub struct TreeFile {
    path: PathBuf,
}

impl TreeFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BookmarkSource for TreeFile {
    fn describe(&self) -> String {
        format!("bookmark tree file {}", self.path.display())
    }

    fn fetch_tree(&self) -> Result<Vec<BookmarkNode>> {
        let content = read_source_file(&self.path)?;
        let tree = match serde_json::from_str::<TreeShape>(&content)? {
            TreeShape::Many(nodes) => nodes,
            TreeShape::One(node) => vec![node],
        };
        info!("Read {} root node(s) from {}", tree.len(), self.path.display());
        Ok(tree)
    }
}

/// Chrome/Chromium's profile `Bookmarks` file.
#[derive(Debug, Clone)]
pub struct ChromeBookmarksFile {
    path: PathBuf,
}

impl ChromeBookmarksFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the default Chrome profile's bookmarks on this platform.
    pub fn default_location() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        let path = if cfg!(windows) {
            base.data_local_dir()
                .join("Google")
                .join("Chrome")
                .join("User Data")
                .join("Default")
                .join("Bookmarks")
        } else if cfg!(target_os = "macos") {
            base.config_dir()
                .join("Google")
                .join("Chrome")
                .join("Default")
                .join("Bookmarks")
        } else {
            base.config_dir()
                .join("google-chrome")
                .join("Default")
                .join("Bookmarks")
        };
        Some(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BookmarkSource for ChromeBookmarksFile {
    fn describe(&self) -> String {
        format!("Chrome bookmarks file {}", self.path.display())
    }

    fn fetch_tree(&self) -> Result<Vec<BookmarkNode>> {
        let content = read_source_file(&self.path)?;
        let file: ChromeFile = serde_json::from_str(&content)?;
        let roots: Vec<BookmarkNode> = [file.roots.bookmark_bar, file.roots.other, file.roots.synced]
            .into_iter()
            .flatten()
            .map(BookmarkNode::from)
            .collect();

        info!("Read {} Chrome root folder(s) from {}", roots.len(), self.path.display());
        Ok(vec![BookmarkNode::root(roots)])
    }
}
