use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use log::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::{
    descendant_ids, load_record_from_file, match_links, sort_folders, validate_id,
    validate_unique_ids, write_json_atomic, Config, Folder, FolderChanges, ImportResult, Link,
    LinkChanges, Result, ShelfError,
};

const LINKS_DIR: &str = "links";
const FOLDERS_DIR: &str = "folders";

/// Manages the storage and retrieval of links and folders.
///
/// Every record is one JSON file under `data_dir/links` or `data_dir/folders`.
/// All records are cached in memory; reads never touch the disk.
pub struct LinkStore {
    /// Root directory of the record files
    data_dir: PathBuf,

    /// In-memory cache of links, indexed by link ID
    links_cache: Arc<Mutex<HashMap<String, Link>>>,

    /// In-memory cache of folders, indexed by folder ID
    folders_cache: Arc<Mutex<HashMap<String, Folder>>>,
}

impl LinkStore {
    /// Opens the store described by `config`, creating directories as needed
    /// and loading every record into the cache.
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_at(&config.data_dir)
    }

    pub fn open_at(data_dir: &Path) -> Result<Self> {
        info!("Opening LinkStore at {}", data_dir.display());

        for dir in [data_dir.join(LINKS_DIR), data_dir.join(FOLDERS_DIR)] {
            if !dir.exists() {
                debug!("Directory does not exist, creating: {}", dir.display());
                fs::create_dir_all(&dir).map_err(|e| {
                    error!("Failed to create directory {}: {}", dir.display(), e);
                    ShelfError::DirectoryError { path: dir.clone() }
                })?;
            }
        }

        let store = Self {
            data_dir: data_dir.to_path_buf(),
            links_cache: Arc::new(Mutex::new(HashMap::new())),
            folders_cache: Arc::new(Mutex::new(HashMap::new())),
        };
        store.load_records()?;
        Ok(store)
    }

    /// Loads all records from disk into the in-memory caches.
    ///
    /// Unreadable files are logged and skipped.
    ///
    /// # Returns
    ///
    /// The number of `(links, folders)` loaded
    pub fn load_records(&self) -> Result<(usize, usize)> {
        let links: HashMap<String, Link> = load_dir(&self.data_dir.join(LINKS_DIR), |l: &Link| {
            l.id.clone()
        });
        let folders: HashMap<String, Folder> =
            load_dir(&self.data_dir.join(FOLDERS_DIR), |f: &Folder| f.id.clone());
        let counts = (links.len(), folders.len());

        *self.links()? = links;
        *self.folders()? = folders;

        info!("Loaded {} links and {} folders into cache", counts.0, counts.1);
        Ok(counts)
    }

    fn links(&self) -> Result<MutexGuard<'_, HashMap<String, Link>>> {
        self.links_cache
            .lock()
            .map_err(|_| ShelfError::LockAcquisitionFailed {
                message: "Failed to acquire lock on links cache".to_string(),
            })
    }

    fn folders(&self) -> Result<MutexGuard<'_, HashMap<String, Folder>>> {
        self.folders_cache
            .lock()
            .map_err(|_| ShelfError::LockAcquisitionFailed {
                message: "Failed to acquire lock on folders cache".to_string(),
            })
    }

    fn link_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(LINKS_DIR).join(format!("{}.json", id))
    }

    fn folder_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(FOLDERS_DIR).join(format!("{}.json", id))
    }

    fn persist_link(&self, link: &Link) -> Result<()> {
        debug!("Writing link file: {}", self.link_path(&link.id).display());
        write_json_atomic(&self.link_path(&link.id), link)
    }

    fn persist_folder(&self, folder: &Folder) -> Result<()> {
        debug!("Writing folder file: {}", self.folder_path(&folder.id).display());
        write_json_atomic(&self.folder_path(&folder.id), folder)
    }

    // ---- links ----

    pub fn add_link(&self, link: Link) -> Result<()> {
        validate_id(&link.id)?;
        let mut links = self.links()?;
        if links.contains_key(&link.id) {
            return Err(ShelfError::LinkAlreadyExists { id: link.id });
        }

        self.persist_link(&link)?;
        info!("Link added: {}", link.id);
        links.insert(link.id.clone(), link);
        Ok(())
    }

    pub fn get_link(&self, id: &str) -> Result<Option<Link>> {
        Ok(self.links()?.get(id).cloned())
    }

    /// Applies `changes` to the link and returns the updated record.
    pub fn update_link(&self, id: &str, changes: LinkChanges) -> Result<Link> {
        let mut links = self.links()?;
        let link = links.get_mut(id).ok_or_else(|| ShelfError::LinkNotFound {
            id: id.to_string(),
        })?;

        let mut updated = link.clone();
        changes.apply(&mut updated);
        self.persist_link(&updated)?;
        *link = updated.clone();

        info!("Link updated: {}", id);
        Ok(updated)
    }

    /// Bumps the use counter. Unknown ids are ignored.
    pub fn increment_link_use_count(&self, id: &str) -> Result<Option<Link>> {
        let current = match self.get_link(id)? {
            Some(link) => link.use_count,
            None => {
                debug!("Ignoring use count bump for unknown link {}", id);
                return Ok(None);
            }
        };

        let changes = LinkChanges {
            use_count: Some(current.saturating_add(1)),
            ..Default::default()
        };
        self.update_link(id, changes).map(Some)
    }

    /// Deletes a link and removes its id from every folder (best effort).
    pub fn delete_link(&self, id: &str) -> Result<()> {
        info!("Deleting link: {}", id);
        {
            let mut links = self.links()?;
            if !links.contains_key(id) {
                return Err(ShelfError::LinkNotFound { id: id.to_string() });
            }

            let path = self.link_path(id);
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    error!("Failed to delete link file {}: {}", path.display(), e);
                    ShelfError::Io(e)
                })?;
            }
            links.remove(id);
        }

        let mut folders = self.folders()?;
        for folder in folders.values_mut().filter(|f| f.contains_link(id)) {
            folder.links.retain(|link_id| link_id != id);
            if let Err(e) = self.persist_folder(folder) {
                warn!("Failed to drop link {} from folder {}: {}", id, folder.id, e);
            }
        }

        Ok(())
    }

    /// Snapshot of every link, oldest first.
    pub fn get_all_links(&self) -> Result<Vec<Link>> {
        let mut links: Vec<Link> = self.links()?.values().cloned().collect();
        links.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(links)
    }

    pub fn search_links(&self, query: &str) -> Result<Vec<Link>> {
        info!("Searching links with query: '{}'", query);
        let links = self.get_all_links()?;
        Ok(match_links(query, &links).into_iter().cloned().collect())
    }

    // ---- folders ----

    /// Adds a folder. Its parent, if any, must already be stored.
    pub fn add_folder(&self, folder: Folder) -> Result<()> {
        validate_id(&folder.id)?;
        let mut folders = self.folders()?;
        if folders.contains_key(&folder.id) {
            return Err(ShelfError::FolderAlreadyExists { id: folder.id });
        }
        if let Some(parent) = &folder.parent_id {
            if !folders.contains_key(parent) {
                return Err(ShelfError::FolderNotFound { id: parent.clone() });
            }
        }

        self.persist_folder(&folder)?;
        info!("Folder added: {} ({})", folder.name, folder.id);
        folders.insert(folder.id.clone(), folder);
        Ok(())
    }

    pub fn get_folder(&self, id: &str) -> Result<Option<Folder>> {
        Ok(self.folders()?.get(id).cloned())
    }

    /// Applies `changes` to the folder. Re-parenting must keep the folders a tree.
    pub fn update_folder(&self, id: &str, changes: FolderChanges) -> Result<Folder> {
        let mut folders = self.folders()?;
        if !folders.contains_key(id) {
            return Err(ShelfError::FolderNotFound { id: id.to_string() });
        }

        if let Some(Some(parent)) = &changes.parent_id {
            if !folders.contains_key(parent) {
                return Err(ShelfError::FolderNotFound { id: parent.clone() });
            }
            let snapshot: Vec<Folder> = folders.values().cloned().collect();
            if parent == id || descendant_ids(&snapshot, id).contains(parent) {
                return Err(ShelfError::ApplicationError {
                    message: format!("cannot move folder {} inside itself", id),
                });
            }
        }

        let folder = folders
            .get_mut(id)
            .ok_or_else(|| ShelfError::FolderNotFound { id: id.to_string() })?;
        let mut updated = folder.clone();
        changes.apply(&mut updated);
        self.persist_folder(&updated)?;
        *folder = updated.clone();

        info!("Folder updated: {}", id);
        Ok(updated)
    }

    /// Deletes a folder together with all of its descendants.
    ///
    /// # Returns
    ///
    /// The ids of every removed folder
    pub fn delete_folder(&self, id: &str) -> Result<Vec<String>> {
        info!("Deleting folder: {}", id);
        let mut folders = self.folders()?;
        if !folders.contains_key(id) {
            return Err(ShelfError::FolderNotFound { id: id.to_string() });
        }

        let snapshot: Vec<Folder> = folders.values().cloned().collect();
        let mut removed = vec![id.to_string()];
        removed.extend(descendant_ids(&snapshot, id));

        for folder_id in &removed {
            let path = self.folder_path(folder_id);
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    error!("Failed to delete folder file {}: {}", path.display(), e);
                    ShelfError::Io(e)
                })?;
            }
            folders.remove(folder_id);
        }

        info!("Removed {} folder(s)", removed.len());
        Ok(removed)
    }

    /// Snapshot of every folder, ordered by `order` then creation time.
    pub fn get_all_folders(&self) -> Result<Vec<Folder>> {
        let mut folders: Vec<Folder> = self.folders()?.values().cloned().collect();
        sort_folders(&mut folders);
        Ok(folders)
    }

    /// Assigns `order = index` to each listed folder.
    pub fn update_folders_order(&self, ids: &[String]) -> Result<()> {
        {
            let folders = self.folders()?;
            if let Some(missing) = ids.iter().find(|id| !folders.contains_key(*id)) {
                return Err(ShelfError::FolderNotFound {
                    id: missing.clone(),
                });
            }
        }

        for (index, id) in ids.iter().enumerate() {
            let changes = FolderChanges {
                order: Some(index as i64),
                ..Default::default()
            };
            self.update_folder(id, changes)?;
        }
        Ok(())
    }

    /// Adds a link to a folder's membership list, once.
    pub fn add_link_to_folder(&self, folder_id: &str, link_id: &str) -> Result<Folder> {
        if self.get_link(link_id)?.is_none() {
            return Err(ShelfError::LinkNotFound {
                id: link_id.to_string(),
            });
        }
        let folder = self
            .get_folder(folder_id)?
            .ok_or_else(|| ShelfError::FolderNotFound {
                id: folder_id.to_string(),
            })?;
        if folder.contains_link(link_id) {
            debug!("Link {} already in folder {}", link_id, folder_id);
            return Ok(folder);
        }

        let mut links = folder.links;
        links.push(link_id.to_string());
        self.update_folder(
            folder_id,
            FolderChanges {
                links: Some(links),
                ..Default::default()
            },
        )
    }

    pub fn remove_link_from_folder(&self, folder_id: &str, link_id: &str) -> Result<Folder> {
        let folder = self
            .get_folder(folder_id)?
            .ok_or_else(|| ShelfError::FolderNotFound {
                id: folder_id.to_string(),
            })?;
        let links = folder
            .links
            .into_iter()
            .filter(|id| id != link_id)
            .collect();
        self.update_folder(
            folder_id,
            FolderChanges {
                links: Some(links),
                ..Default::default()
            },
        )
    }

    /// Links that are members of `folder_id`, in membership order.
    pub fn links_in_folder(&self, folder_id: &str) -> Result<Vec<Link>> {
        let folder = self
            .get_folder(folder_id)?
            .ok_or_else(|| ShelfError::FolderNotFound {
                id: folder_id.to_string(),
            })?;
        let links = self.links()?;
        Ok(folder
            .links
            .iter()
            .filter_map(|id| links.get(id).cloned())
            .collect())
    }

    /// Stores the records of one import. Either all of them are stored or,
    /// on any failure, none are.
    pub fn store_import(&self, imported: &ImportResult) -> Result<()> {
        self.check_import(imported)?;

        let mut stored_links: Vec<&str> = Vec::new();
        let mut stored_folders: Vec<&str> = Vec::new();
        let outcome = imported
            .links
            .iter()
            .try_for_each(|link| -> Result<()> {
                self.add_link(link.clone())?;
                stored_links.push(&link.id);
                Ok(())
            })
            .and_then(|_| {
                // Folders are parent-first, so each parent is stored before its children.
                imported.folders.iter().try_for_each(|folder| -> Result<()> {
                    self.add_folder(folder.clone())?;
                    stored_folders.push(&folder.id);
                    Ok(())
                })
            });

        if let Err(e) = outcome {
            error!(
                "Import failed after {} links and {} folders, rolling back: {}",
                stored_links.len(),
                stored_folders.len(),
                e
            );
            self.discard(&stored_links, &stored_folders)?;
            return Err(e);
        }

        info!(
            "Stored import of {} links and {} folders",
            imported.links.len(),
            imported.folders.len()
        );
        Ok(())
    }

    /// Rejects an import that could not be stored in full.
    fn check_import(&self, imported: &ImportResult) -> Result<()> {
        validate_unique_ids(imported.links.iter().map(|l| l.id.as_str()))?;
        validate_unique_ids(imported.folders.iter().map(|f| f.id.as_str()))?;

        let links = self.links()?;
        if let Some(link) = imported.links.iter().find(|l| links.contains_key(&l.id)) {
            return Err(ShelfError::LinkAlreadyExists {
                id: link.id.clone(),
            });
        }

        let folders = self.folders()?;
        let mut known: HashSet<&str> = folders.keys().map(String::as_str).collect();
        for folder in &imported.folders {
            if folders.contains_key(&folder.id) {
                return Err(ShelfError::FolderAlreadyExists {
                    id: folder.id.clone(),
                });
            }
            if let Some(parent) = &folder.parent_id {
                if !known.contains(parent.as_str()) {
                    return Err(ShelfError::FolderNotFound { id: parent.clone() });
                }
            }
            known.insert(&folder.id);
        }
        Ok(())
    }

    fn discard(&self, link_ids: &[&str], folder_ids: &[&str]) -> Result<()> {
        let mut links = self.links()?;
        for id in link_ids {
            remove_if_exists(&self.link_path(id))?;
            links.remove(*id);
        }
        let mut folders = self.folders()?;
        for id in folder_ids {
            remove_if_exists(&self.folder_path(id))?;
            folders.remove(*id);
        }
        Ok(())
    }

    /// Removes every link and folder.
    pub fn clear(&self) -> Result<()> {
        warn!("Clearing all links and folders in {}", self.data_dir.display());
        let mut links = self.links()?;
        let mut folders = self.folders()?;

        for id in links.keys() {
            remove_if_exists(&self.link_path(id))?;
        }
        for id in folders.keys() {
            remove_if_exists(&self.folder_path(id))?;
        }

        links.clear();
        folders.clear();
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| {
            error!("Failed to delete {}: {}", path.display(), e);
            ShelfError::Io(e)
        })?;
    }
    Ok(())
}

/// Walks `dir` and loads every `*.json` record, keyed by `key`.
fn load_dir<T, K>(dir: &Path, key: K) -> HashMap<String, T>
where
    T: serde::de::DeserializeOwned,
    K: Fn(&T) -> String,
{
    let mut records = HashMap::new();
    let mut failures = 0usize;

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !(path.is_file() && path.extension().is_some_and(|ext| ext == "json")) {
            continue;
        }

        match load_record_from_file::<T>(path) {
            Ok(record) => {
                records.insert(key(&record), record);
            }
            Err(e) => {
                failures += 1;
                warn!("Failed to load record from {}: {}", path.display(), e);
            }
        }
    }

    if failures > 0 {
        error!("Encountered {} errors while loading {}", failures, dir.display());
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, LinkStore) {
        let dir = TempDir::new().unwrap();
        let store = LinkStore::open_at(dir.path()).unwrap();
        (dir, store)
    }

    fn link(name: &str, url: &str) -> Link {
        Link::new(name.to_string(), url.to_string(), vec![])
    }

    #[test]
    fn links_survive_reopen() {
        let (dir, store) = store();
        let github = link("GitHub", "https://github.com");
        store.add_link(github.clone()).unwrap();
        drop(store);

        let reopened = LinkStore::open_at(dir.path()).unwrap();
        assert_eq!(reopened.get_all_links().unwrap(), vec![github]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let (_dir, store) = store();
        let github = link("GitHub", "https://github.com");
        store.add_link(github.clone()).unwrap();
        assert!(matches!(
            store.add_link(github),
            Err(ShelfError::LinkAlreadyExists { .. })
        ));
    }

    #[test]
    fn update_and_use_count() {
        let (_dir, store) = store();
        let github = link("GitHub", "https://github.com");
        store.add_link(github.clone()).unwrap();

        let updated = store
            .update_link(
                &github.id,
                LinkChanges {
                    tags: Some(vec!["code".to_string()]),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.tags, vec!["code"]);

        store.increment_link_use_count(&github.id).unwrap();
        store.increment_link_use_count(&github.id).unwrap();
        assert_eq!(store.get_link(&github.id).unwrap().unwrap().use_count, 2);
        assert!(store.increment_link_use_count("missing").unwrap().is_none());
        assert!(store.update_link("missing", LinkChanges::default()).is_err());
    }

    #[test]
    fn deleting_link_cleans_folder_membership() {
        let (dir, store) = store();
        let github = link("GitHub", "https://github.com");
        let folder = Folder::new("Dev".to_string(), None);
        store.add_link(github.clone()).unwrap();
        store.add_folder(folder.clone()).unwrap();
        store.add_link_to_folder(&folder.id, &github.id).unwrap();
        store.add_link_to_folder(&folder.id, &github.id).unwrap();
        assert_eq!(store.get_folder(&folder.id).unwrap().unwrap().links.len(), 1);

        store.delete_link(&github.id).unwrap();

        assert!(store.get_all_links().unwrap().is_empty());
        assert!(store.get_folder(&folder.id).unwrap().unwrap().links.is_empty());
        let reopened = LinkStore::open_at(dir.path()).unwrap();
        assert!(reopened.get_folder(&folder.id).unwrap().unwrap().links.is_empty());
    }

    #[test]
    fn deleting_folder_removes_descendants() {
        let (_dir, store) = store();
        let top = Folder::new("Top".to_string(), None);
        let mid = Folder::new("Mid".to_string(), Some(top.id.clone()));
        let leaf = Folder::new("Leaf".to_string(), Some(mid.id.clone()));
        let other = Folder::new("Other".to_string(), None);
        for f in [&top, &mid, &leaf, &other] {
            store.add_folder(f.clone()).unwrap();
        }

        let removed = store.delete_folder(&top.id).unwrap();

        assert_eq!(removed.len(), 3);
        let remaining = store.get_all_folders().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, other.id);
    }

    #[test]
    fn folders_need_existing_parents_and_no_cycles() {
        let (_dir, store) = store();
        let orphan = Folder::new("Orphan".to_string(), Some("nope".to_string()));
        assert!(matches!(
            store.add_folder(orphan),
            Err(ShelfError::FolderNotFound { .. })
        ));

        let top = Folder::new("Top".to_string(), None);
        let child = Folder::new("Child".to_string(), Some(top.id.clone()));
        store.add_folder(top.clone()).unwrap();
        store.add_folder(child.clone()).unwrap();

        let cycle = FolderChanges {
            parent_id: Some(Some(child.id.clone())),
            ..Default::default()
        };
        assert!(store.update_folder(&top.id, cycle).is_err());

        let to_root = FolderChanges {
            parent_id: Some(None),
            ..Default::default()
        };
        assert!(store.update_folder(&child.id, to_root).unwrap().parent_id.is_none());
    }

    #[test]
    fn reorder_assigns_indices() {
        let (_dir, store) = store();
        let a = Folder::new("A".to_string(), None);
        let b = Folder::new("B".to_string(), None);
        store.add_folder(a.clone()).unwrap();
        store.add_folder(b.clone()).unwrap();

        store
            .update_folders_order(&[b.id.clone(), a.id.clone()])
            .unwrap();

        let names: Vec<_> = store
            .get_all_folders()
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);
        assert!(store.update_folders_order(&["ghost".to_string()]).is_err());
    }

    #[test]
    fn search_uses_matcher() {
        let (_dir, store) = store();
        store.add_link(link("GitHub", "https://github.com")).unwrap();
        let mut docs = link("Docs", "https://docs.io");
        docs.tags = vec!["git".to_string()];
        store.add_link(docs).unwrap();
        store.add_link(link("News", "https://news.example")).unwrap();

        assert_eq!(store.search_links("git").unwrap().len(), 2);
        assert!(store.search_links(" ").unwrap().is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let (dir, store) = store();
        store.add_link(link("GitHub", "https://github.com")).unwrap();
        store.add_folder(Folder::new("Dev".to_string(), None)).unwrap();

        store.clear().unwrap();

        assert!(store.get_all_links().unwrap().is_empty());
        let reopened = LinkStore::open_at(dir.path()).unwrap();
        assert!(reopened.get_all_folders().unwrap().is_empty());
    }

    #[test]
    fn corrupt_files_are_skipped() {
        let (dir, store) = store();
        store.add_link(link("GitHub", "https://github.com")).unwrap();
        fs::write(dir.path().join(LINKS_DIR).join("broken.json"), "{not json").unwrap();

        assert_eq!(store.load_records().unwrap(), (1, 0));
    }

    #[test]
    fn use_count_saturates() {
        let (_dir, store) = store();
        let mut worn = link("Worn", "https://worn.example");
        worn.use_count = u64::MAX;
        store.add_link(worn.clone()).unwrap();

        let bumped = store.increment_link_use_count(&worn.id).unwrap().unwrap();
        assert_eq!(bumped.use_count, u64::MAX);
    }

    fn sample_import() -> ImportResult {
        let github = link("GitHub", "https://github.com");
        let mut dev = Folder::new("Dev".to_string(), None);
        dev.links.push(github.id.clone());
        let rust = Folder::new("Rust".to_string(), Some(dev.id.clone()));
        ImportResult {
            links: vec![github],
            folders: vec![dev, rust],
        }
    }

    #[test]
    fn import_is_stored_in_full() {
        let (_dir, store) = store();
        let imported = sample_import();

        store.store_import(&imported).unwrap();

        assert_eq!(store.get_all_links().unwrap(), imported.links);
        assert_eq!(store.get_all_folders().unwrap().len(), 2);
    }

    #[test]
    fn conflicting_import_stores_nothing() {
        let (_dir, store) = store();
        let imported = sample_import();
        store.add_folder(imported.folders[0].clone()).unwrap();

        assert!(matches!(
            store.store_import(&imported),
            Err(ShelfError::FolderAlreadyExists { .. })
        ));
        assert!(store.get_all_links().unwrap().is_empty());
        assert_eq!(store.get_all_folders().unwrap().len(), 1);
    }

    #[test]
    fn failed_write_rolls_back_import() {
        let (dir, store) = store();
        let imported = sample_import();
        // A directory in place of the record file makes the write fail.
        let blocked = dir
            .path()
            .join(FOLDERS_DIR)
            .join(format!("{}.json", imported.folders[1].id));
        fs::create_dir(&blocked).unwrap();

        assert!(store.store_import(&imported).is_err());

        assert!(store.get_all_links().unwrap().is_empty());
        assert!(store.get_all_folders().unwrap().is_empty());
        let reopened = LinkStore::open_at(dir.path()).unwrap();
        assert!(reopened.get_all_links().unwrap().is_empty());
        assert!(reopened.get_all_folders().unwrap().is_empty());
    }

    #[test]
    fn links_in_folder_follow_membership_order() {
        let (_dir, store) = store();
        let a = link("A", "https://a.example");
        let b = link("B", "https://b.example");
        let folder = Folder::new("Dev".to_string(), None);
        store.add_link(a.clone()).unwrap();
        store.add_link(b.clone()).unwrap();
        store.add_folder(folder.clone()).unwrap();
        store.add_link_to_folder(&folder.id, &b.id).unwrap();
        store.add_link_to_folder(&folder.id, &a.id).unwrap();

        let names: Vec<_> = store
            .links_in_folder(&folder.id)
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);

        store.remove_link_from_folder(&folder.id, &b.id).unwrap();
        assert_eq!(store.links_in_folder(&folder.id).unwrap().len(), 1);
    }
}
