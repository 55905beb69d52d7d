//! Flattens native bookmark trees into [`Link`] and [`Folder`] records.
use chrono::{DateTime, Utc};
use log::{debug, error, info, trace};

use crate::{
    new_id, now_millis, BookmarkNode, BookmarkSource, Folder, Link, Result, ShelfError,
};

/// Records produced by one import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportResult {
    pub links: Vec<Link>,
    pub folders: Vec<Folder>,
}

/// Depth-first, pre-order converter from bookmark trees to flat records.
///
/// Every folder gets `order` equal to the number of folders emitted before it,
/// so sibling order follows traversal order across the whole import.
pub struct BookmarkImporter<F = fn() -> String> {
    next_id: F,
}

impl BookmarkImporter {
    /// An importer that hands out random ids.
    pub fn new() -> Self {
        Self {
            next_id: new_id as fn() -> String,
        }
    }
}

impl Default for BookmarkImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FnMut() -> String> BookmarkImporter<F> {
    /// An importer drawing ids from `next_id`, e.g. a seeded generator in tests.
    pub fn with_id_source(next_id: F) -> Self {
        Self { next_id }
    }

    pub fn import(&mut self, nodes: &[BookmarkNode]) -> ImportResult {
        let now = now_millis();
        let mut out = ImportResult::default();
        for node in nodes {
            self.visit(node, None, now, &mut out);
        }
        debug!(
            "Flattened tree into {} links and {} folders",
            out.links.len(),
            out.folders.len()
        );
        out
    }

    fn visit(
        &mut self,
        node: &BookmarkNode,
        parent_id: Option<&str>,
        now: DateTime<Utc>,
        out: &mut ImportResult,
    ) {
        match node {
            BookmarkNode::Folder { children, .. } if node.is_transparent() => {
                trace!("Descending into untitled container");
                for child in children {
                    self.visit(child, None, now, out);
                }
            }
            BookmarkNode::Folder {
                title,
                date_added,
                children,
            } => {
                let folder = Folder {
                    id: (self.next_id)(),
                    name: title.clone().unwrap_or_default(),
                    parent_id: parent_id.map(str::to_string),
                    children: Vec::new(),
                    links: Vec::new(),
                    created_at: date_added.unwrap_or(now),
                    order: Some(out.folders.len() as i64),
                };
                let folder_id = folder.id.clone();
                trace!("Folder {} -> {}", folder.name, folder_id);
                out.folders.push(folder);

                for child in children {
                    self.visit(child, Some(&folder_id), now, out);
                }
            }
            BookmarkNode::Bookmark {
                title,
                url,
                date_added,
            } => {
                let link = Link {
                    id: (self.next_id)(),
                    name: if title.is_empty() {
                        url.clone()
                    } else {
                        title.clone()
                    },
                    url: url.clone(),
                    notes: Some(String::new()),
                    tags: Vec::new(),
                    created_at: date_added.unwrap_or(now),
                    use_count: 0,
                };

                // Parents are always emitted before their children, so a
                // missing parent here means the id is dropped.
                if let Some(parent_id) = parent_id {
                    if let Some(parent) = out.folders.iter_mut().rev().find(|f| f.id == parent_id) {
                        parent.links.push(link.id.clone());
                    }
                }
                out.links.push(link);
            }
        }
    }
}

/// Fetches the whole tree from `source` and flattens it.
///
/// Any failure to obtain the tree becomes [`ShelfError::ImportFailure`];
/// nothing is returned for partially read sources.
pub fn import_from<S: BookmarkSource + ?Sized>(source: &S) -> Result<ImportResult> {
    info!("Importing bookmarks from {}", source.describe());
    let tree = source.fetch_tree().map_err(|e| {
        error!("Failed to import bookmarks from {}: {}", source.describe(), e);
        ShelfError::import_failure(e.to_string())
    })?;

    let result = BookmarkImporter::new().import(&tree);
    info!(
        "Imported {} bookmarks and {} folders",
        result.links.len(),
        result.folders.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn counter() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("id{n}")
        }
    }

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn sample_tree() -> Vec<BookmarkNode> {
        vec![BookmarkNode::root(vec![
            BookmarkNode::folder(
                "Bookmarks bar",
                vec![
                    BookmarkNode::bookmark("Rust", "https://rust-lang.org").with_date_added(at(1_000)),
                    BookmarkNode::folder(
                        "Docs",
                        vec![BookmarkNode::bookmark("", "https://docs.rs").with_date_added(at(2_000))],
                    )
                    .with_date_added(at(500)),
                ],
            )
            .with_date_added(at(100)),
            BookmarkNode::folder("Other bookmarks", vec![]).with_date_added(at(100)),
        ])]
    }

    struct BrokenSource;

    impl BookmarkSource for BrokenSource {
        fn describe(&self) -> String {
            "broken source".to_string()
        }

        fn fetch_tree(&self) -> Result<Vec<BookmarkNode>> {
            Err(ShelfError::ApplicationError {
                message: "bookmarks API unavailable".to_string(),
            })
        }
    }

    #[test]
    fn work_folder_example() {
        let tree = vec![BookmarkNode::folder(
            "Work",
            vec![BookmarkNode::bookmark("Site A", "http://a.com")],
        )];

        let result = BookmarkImporter::new().import(&tree);

        assert_eq!(result.folders.len(), 1);
        assert_eq!(result.links.len(), 1);
        assert_eq!(result.folders[0].name, "Work");
        assert_eq!(result.folders[0].parent_id, None);
        assert_eq!(result.folders[0].links, vec![result.links[0].id.clone()]);
        assert_eq!(result.links[0].name, "Site A");
        assert_eq!(result.links[0].notes.as_deref(), Some(""));
        assert!(result.links[0].tags.is_empty());
        assert_eq!(result.links[0].use_count, 0);
    }

    #[test]
    fn untitled_root_is_transparent() {
        let result = BookmarkImporter::with_id_source(counter()).import(&sample_tree());

        let names: Vec<_> = result.folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Bookmarks bar", "Docs", "Other bookmarks"]);
        assert_eq!(result.folders[0].parent_id, None);
        assert_eq!(result.folders[2].parent_id, None);
        assert_eq!(result.folders[1].parent_id.as_deref(), Some(result.folders[0].id.as_str()));
    }

    #[test]
    fn order_follows_global_traversal() {
        let result = BookmarkImporter::with_id_source(counter()).import(&sample_tree());
        let orders: Vec<_> = result.folders.iter().map(|f| f.order).collect();
        assert_eq!(orders, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn untitled_bookmark_uses_url_and_keeps_timestamps() {
        let result = BookmarkImporter::with_id_source(counter()).import(&sample_tree());
        let docs = result.links.iter().find(|l| l.url == "https://docs.rs").unwrap();
        assert_eq!(docs.name, "https://docs.rs");
        assert_eq!(docs.created_at, at(2_000));
        assert_eq!(result.folders[1].created_at, at(500));
        assert_eq!(result.folders[1].links, vec![docs.id.clone()]);
    }

    #[test]
    fn every_leaf_and_titled_folder_is_emitted_once() {
        let tree = sample_tree();
        let (expected_links, expected_folders) = tree[0].count();
        let result = BookmarkImporter::new().import(&tree);

        assert_eq!(result.links.len(), expected_links);
        assert_eq!(result.folders.len(), expected_folders);

        let folder_ids: HashSet<_> = result.folders.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(folder_ids.len(), result.folders.len());
        for folder in &result.folders {
            if let Some(parent) = &folder.parent_id {
                assert!(folder_ids.contains(parent.as_str()));
                assert_ne!(parent, &folder.id);
            }
        }
    }

    #[test]
    fn top_level_bookmarks_have_no_folder() {
        let tree = vec![BookmarkNode::bookmark("Loose", "https://loose.example")];
        let result = BookmarkImporter::new().import(&tree);
        assert_eq!(result.links.len(), 1);
        assert!(result.folders.is_empty());
    }

    #[test]
    fn seeded_imports_are_identical() {
        let tree = sample_tree();
        let first = BookmarkImporter::with_id_source(counter()).import(&tree);
        let second = BookmarkImporter::with_id_source(counter()).import(&tree);
        assert_eq!(first, second);
    }

    #[test]
    fn broken_source_fails_whole_import() {
        let err = import_from(&BrokenSource).unwrap_err();
        assert!(matches!(err, ShelfError::ImportFailure { .. }));
        assert_eq!(err.to_string(), "import failed");
    }

    #[test]
    fn in_memory_source_imports() {
        let result = import_from(&sample_tree()).unwrap();
        assert_eq!(result.links.len(), 2);
        assert_eq!(result.folders.len(), 3);
    }
}
