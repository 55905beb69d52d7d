//! Folder records and helpers for walking the one-parent folder tree.
use std::{cmp::Ordering, collections::HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{new_id, now_millis, Result, ShelfError};

/// A named grouping node holding a denormalized list of link ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Unique identifier for the folder
    pub id: String,
    /// Display name
    pub name: String,
    /// Parent folder, absent for top-level folders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Legacy field, carried for round-trips only
    #[serde(default)]
    pub children: Vec<String>,
    /// Ids of the member links
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Sibling sort key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Folder {
    pub fn new(name: String, parent_id: Option<String>) -> Self {
        Folder {
            id: new_id(),
            name,
            parent_id,
            children: Vec::new(),
            links: Vec::new(),
            created_at: now_millis(),
            order: None,
        }
    }

    pub fn contains_link(&self, link_id: &str) -> bool {
        self.links.iter().any(|id| id == link_id)
    }
}

/// A partial update to a [`Folder`]. `parent_id: Some(None)` moves the folder
/// to the top level.
#[derive(Debug, Clone, Default)]
pub struct FolderChanges {
    pub name: Option<String>,
    pub parent_id: Option<Option<String>>,
    pub links: Option<Vec<String>>,
    pub order: Option<i64>,
}

impl FolderChanges {
    pub fn apply(self, folder: &mut Folder) {
        if let Some(name) = self.name {
            folder.name = name;
        }
        if let Some(parent_id) = self.parent_id {
            folder.parent_id = parent_id;
        }
        if let Some(links) = self.links {
            folder.links = links;
        }
        if let Some(order) = self.order {
            folder.order = Some(order);
        }
    }
}

/// Direct children of `parent_id` (`None` for top-level folders), in input order.
pub fn child_folders<'a>(folders: &'a [Folder], parent_id: Option<&str>) -> Vec<&'a Folder> {
    folders
        .iter()
        .filter(|f| f.parent_id.as_deref() == parent_id)
        .collect()
}

/// All folders below `folder_id`, depth-first. `folder_id` itself is not included.
pub fn descendant_ids(folders: &[Folder], folder_id: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut stack = vec![folder_id.to_string()];
    let mut seen = HashSet::new();

    while let Some(current) = stack.pop() {
        for child in folders
            .iter()
            .filter(|f| f.parent_id.as_deref() == Some(current.as_str()))
        {
            if seen.insert(child.id.clone()) {
                found.push(child.id.clone());
                stack.push(child.id.clone());
            }
        }
    }

    found
}

/// Sort key used when listing folders: explicit `order` first, then creation time.
pub fn sort_folders(folders: &mut [Folder]) {
    folders.sort_by(|a, b| {
        let by_order = match (a.order, b.order) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_order
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Reorders `folders` so every parent precedes its children.
///
/// Fails when a folder references a parent that is not part of the set, or
/// when parents form a cycle.
pub fn parent_first(folders: Vec<Folder>) -> Result<Vec<Folder>> {
    let ids: HashSet<&str> = folders.iter().map(|f| f.id.as_str()).collect();
    if let Some(orphan) = folders
        .iter()
        .find(|f| f.parent_id.as_deref().is_some_and(|p| !ids.contains(p)))
    {
        return Err(ShelfError::InvalidFormat {
            message: format!("folder {} references a missing parent", orphan.id),
        });
    }

    let mut placed: HashSet<String> = HashSet::with_capacity(folders.len());
    let mut ordered = Vec::with_capacity(folders.len());
    let mut remaining = folders;

    while !remaining.is_empty() {
        let (ready, blocked): (Vec<Folder>, Vec<Folder>) =
            remaining.into_iter().partition(|f| match &f.parent_id {
                None => true,
                Some(parent) => placed.contains(parent),
            });

        if ready.is_empty() {
            return Err(ShelfError::InvalidFormat {
                message: format!("folder parents form a cycle involving {}", blocked[0].id),
            });
        }

        for folder in ready {
            placed.insert(folder.id.clone());
            ordered.push(folder);
        }
        remaining = blocked;
    }

    Ok(ordered)
}
