//! CLI module for the shelfmark application
//!
//! This module handles the command-line interface for interacting with the
//! link store.
use std::{
    io::{stdin, stdout, Write},
    path::PathBuf,
    sync::Arc,
};

use chrono::Local;
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tokio::time::Duration;

use crate::{
    child_folders, export_file_name, export_to_file, filter_by_tags, import_from, parse_tags,
    restore, sort_links, BookmarkSource, ChromeBookmarksFile, Commands, Config, ExportedConfig,
    Folder, FolderChanges, FolderCommands, Link, LinkChanges, LinkStore, Result, SearchDebouncer,
    SearchResults, ShelfError, ShortcutCommands, ShortcutKeys, ShortcutMatch, ShortcutRegistry,
    SortBy, TreeFile,
};

/// In-page actions bound to keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    NewLink,
    NewFolder,
}

/// The registry used by the interactive views: the built-in commands plus
/// the configured search shortcut.
pub fn default_shortcuts(search: &ShortcutKeys) -> ShortcutRegistry<AppAction> {
    let mut registry = ShortcutRegistry::new(search.clone());
    registry.register(
        ShortcutKeys::new(true, true, false, "N"),
        "New link",
        AppAction::NewLink,
    );
    registry.register(
        ShortcutKeys::new(true, true, false, "F"),
        "New folder",
        AppAction::NewFolder,
    );
    registry
}

/// CLI Application handler - processes CLI commands and interfaces with LinkStore
pub struct App {
    /// The link storage backend
    store: Arc<Mutex<LinkStore>>,

    /// Application configuration
    config: Config,

    /// Where the configuration is saved
    config_path: PathBuf,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application with the given storage backend and config
    pub fn new(
        store: Arc<Mutex<LinkStore>>,
        config: Config,
        config_path: PathBuf,
        verbose: bool,
    ) -> Self {
        Self {
            store,
            config,
            config_path,
            verbose,
        }
    }

    /// Run the CLI application with the given command
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Add {
                url,
                name,
                notes,
                tags,
                folder,
            } => self.handle_add(url, name, notes, tags, folder).await?,

            Commands::List {
                tag,
                folder,
                sort,
                limit,
                json,
            } => self.handle_list(tag, folder, sort, limit, json).await?,

            Commands::Search { query, limit, json } => {
                self.handle_search(query, limit, json).await?
            }

            Commands::Find => self.handle_find().await?,

            Commands::Open { id } => self.handle_open(id).await?,

            Commands::Edit {
                id,
                name,
                url,
                notes,
                tags,
            } => {
                let changes = LinkChanges {
                    name,
                    url,
                    notes,
                    tags: tags.map(|t| parse_tags(Some(t))),
                    use_count: None,
                };
                self.handle_edit(id, changes).await?
            }

            Commands::Delete { id, force } => self.handle_delete(id, force).await?,

            Commands::Tag {
                id,
                add,
                remove,
                list,
            } => self.handle_tag(id, add, remove, list).await?,

            Commands::Folder { command } => self.handle_folder(command).await?,

            Commands::Import { source, chrome } => self.handle_import(source, chrome).await?,

            Commands::Export { output } => self.handle_export(output).await?,

            Commands::Restore { file, force } => self.handle_restore(file, force).await?,

            Commands::Clear { force } => self.handle_clear(force).await?,

            Commands::Shortcut { command } => self.handle_shortcut(command)?,

            Commands::Config { show, set, reset } => self.handle_config(show, set, reset)?,
        }

        Ok(())
    }

    async fn handle_add(
        &self,
        url: String,
        name: Option<String>,
        notes: Option<String>,
        tags: Option<String>,
        folder: Option<String>,
    ) -> Result<()> {
        let mut link = Link::new(name.unwrap_or_default(), url, parse_tags(tags));
        link.notes = notes;

        let store = self.store.lock().await;
        if let Some(folder_id) = &folder {
            if store.get_folder(folder_id)?.is_none() {
                return Err(ShelfError::FolderNotFound {
                    id: folder_id.clone(),
                });
            }
        }

        store.add_link(link.clone())?;
        if let Some(folder_id) = folder {
            store.add_link_to_folder(&folder_id, &link.id)?;
        }

        println!("Link added with ID: {}", link.id);
        Ok(())
    }

    async fn handle_list(
        &self,
        tags: Vec<String>,
        folder: Option<String>,
        sort_by: SortBy,
        limit: usize,
        json: bool,
    ) -> Result<()> {
        // Step 1: Retrieve links, optionally scoped to a folder
        let links = {
            let store = self.store.lock().await;
            match &folder {
                Some(folder_id) => store.links_in_folder(folder_id)?,
                None => store.get_all_links()?,
            }
        };

        // Step 2: Filter and sort
        let mut links = filter_by_tags(links, &tags);
        sort_links(&mut links, sort_by);

        // Step 3: Apply limit
        if limit > 0 && links.len() > limit {
            links.truncate(limit);
        }

        // Step 4: Display links in requested format
        if json {
            display_links_json(&links)?;
        } else if links.is_empty() {
            println!("No links found matching the criteria.");
        } else {
            display_links_text(&links, self.verbose);
            println!(
                "\nFound {} link{}",
                links.len(),
                if links.len() == 1 { "" } else { "s" }
            );
        }
        Ok(())
    }

    async fn handle_search(&self, query: String, limit: Option<usize>, json: bool) -> Result<()> {
        let mut results = self.store.lock().await.search_links(&query)?;

        // 0 means no limit
        let limit = limit.unwrap_or(self.config.search_limit);
        let total = results.len();
        if limit > 0 && total > limit {
            results.truncate(limit);
        }

        if json {
            return display_links_json(&results);
        }

        if results.is_empty() {
            println!("No links found matching query: \"{}\"", query);
            return Ok(());
        }

        display_links_text(&results, self.verbose);
        if results.len() < total {
            println!(
                "\nShowing {} of {} matching links. Use --limit to show more.",
                results.len(),
                total
            );
        } else {
            println!("\nFound {} matching links.", total);
        }
        Ok(())
    }

    /// Reads queries line by line and prints the debounced results.
    async fn handle_find(&self) -> Result<()> {
        let links = Arc::new(self.store.lock().await.get_all_links()?);
        let delay = self.config.search_debounce();
        let limit = self.config.search_limit;

        let mut debouncer = SearchDebouncer::new(delay);
        let mut results = debouncer.subscribe();
        let printer = tokio::spawn(async move {
            while results.changed().await.is_ok() {
                let snapshot = results.borrow_and_update().clone();
                display_search_results(&snapshot, limit);
            }
        });

        println!(
            "Searching {} links. Type a query per line, Ctrl+D to finish.",
            links.len()
        );
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let generation = debouncer.submit(line, Arc::clone(&links));
            debug!("Submitted query generation {}", generation);
        }

        // Let the trailing query settle before shutting the printer down.
        tokio::time::sleep(delay + Duration::from_millis(50)).await;
        drop(debouncer);
        printer.await.map_err(|e| ShelfError::ApplicationError {
            message: format!("Search printer failed: {}", e),
        })?;
        Ok(())
    }

    async fn handle_open(&self, id: String) -> Result<()> {
        let link = self
            .store
            .lock()
            .await
            .increment_link_use_count(&id)?
            .ok_or(ShelfError::LinkNotFound { id })?;

        info!("Opened link {} ({} uses)", link.id, link.use_count);
        println!("{}", link.url);
        Ok(())
    }

    async fn handle_edit(&self, id: String, changes: LinkChanges) -> Result<()> {
        if changes.is_empty() {
            return Err(ShelfError::ApplicationError {
                message: "Nothing to change: pass --name, --url, --notes or --tags".to_string(),
            });
        }

        let link = self.store.lock().await.update_link(&id, changes)?;
        println!("Link '{}' ({}) updated.", link.name, link.id);
        Ok(())
    }

    async fn handle_delete(&self, id: String, force: bool) -> Result<()> {
        // Step 1: Fetch the link to be deleted (to verify it exists and show details in the prompt)
        let link = match self.store.lock().await.get_link(&id)? {
            Some(link) => link,
            None => return Err(ShelfError::LinkNotFound { id }),
        };

        // Step 2: Show link details and prompt for confirmation (unless force flag is set)
        if !force {
            println!("You are about to delete the following link:");
            println!("ID:      {}", link.id);
            println!("Name:    {}", link.name);
            println!("URL:     {}", link.url);
            println!("Tags:    {}", link.tags.join(", "));
            println!("Created: {}", link.created_at.format("%Y-%m-%d %H:%M:%S"));

            if !confirm("Are you sure you want to delete this link?")? {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        // Step 3: Delete the link
        self.store.lock().await.delete_link(&id)?;

        println!("Link '{}' ({}) has been deleted.", link.name, link.id);
        Ok(())
    }

    async fn handle_tag(
        &self,
        id: String,
        add: Option<String>,
        remove: Option<String>,
        list: bool,
    ) -> Result<()> {
        let store = self.store.lock().await;
        let link = store
            .get_link(&id)?
            .ok_or_else(|| ShelfError::LinkNotFound { id: id.clone() })?;

        let to_add = parse_tags(add);
        let to_remove = parse_tags(remove);
        let link = if to_add.is_empty() && to_remove.is_empty() {
            link
        } else {
            let mut tags: Vec<String> = link
                .tags
                .into_iter()
                .filter(|t| !to_remove.contains(t))
                .collect();
            for tag in to_add {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
            let changes = LinkChanges {
                tags: Some(tags),
                ..Default::default()
            };
            store.update_link(&id, changes)?
        };

        if list || self.verbose {
            if link.tags.is_empty() {
                println!("Link {} has no tags.", link.id);
            } else {
                println!("{}", format_tags(&link.tags));
            }
        } else {
            println!("Tags for '{}' updated.", link.name);
        }
        Ok(())
    }

    async fn handle_folder(&self, command: FolderCommands) -> Result<()> {
        let store = self.store.lock().await;
        match command {
            FolderCommands::Create { name, parent } => {
                let folder = Folder::new(name, parent);
                store.add_folder(folder.clone())?;
                println!("Folder created with ID: {}", folder.id);
            }
            FolderCommands::List { json } => {
                let folders = store.get_all_folders()?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&folders)?);
                } else if folders.is_empty() {
                    println!("No folders yet.");
                } else {
                    display_folder_tree(&folders, None, 0, self.verbose);
                }
            }
            FolderCommands::Rename { id, name } => {
                let changes = FolderChanges {
                    name: Some(name),
                    ..Default::default()
                };
                let folder = store.update_folder(&id, changes)?;
                println!("Folder {} renamed to '{}'.", folder.id, folder.name);
            }
            FolderCommands::Move { id, parent } => {
                let changes = FolderChanges {
                    parent_id: Some(parent),
                    ..Default::default()
                };
                let folder = store.update_folder(&id, changes)?;
                match &folder.parent_id {
                    Some(parent) => println!("Folder '{}' moved under {}.", folder.name, parent),
                    None => println!("Folder '{}' moved to the top level.", folder.name),
                }
            }
            FolderCommands::Delete { id, force } => {
                let folder = store
                    .get_folder(&id)?
                    .ok_or_else(|| ShelfError::FolderNotFound { id: id.clone() })?;
                if !force {
                    println!(
                        "You are about to delete folder '{}' and every folder below it.",
                        folder.name
                    );
                    if !confirm("Are you sure?")? {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }
                let removed = store.delete_folder(&id)?;
                println!("Deleted {} folder(s).", removed.len());
            }
            FolderCommands::AddLink { folder, link } => {
                let folder = store.add_link_to_folder(&folder, &link)?;
                println!("Folder '{}' now holds {} link(s).", folder.name, folder.links.len());
            }
            FolderCommands::RemoveLink { folder, link } => {
                let folder = store.remove_link_from_folder(&folder, &link)?;
                println!("Folder '{}' now holds {} link(s).", folder.name, folder.links.len());
            }
            FolderCommands::Reorder { ids } => {
                store.update_folders_order(&ids)?;
                println!("Reordered {} folder(s).", ids.len());
            }
        }
        Ok(())
    }

    async fn handle_import(&self, source: Option<PathBuf>, chrome: bool) -> Result<()> {
        let source: Box<dyn BookmarkSource> = match (source, chrome) {
            (Some(path), false) => Box::new(TreeFile::new(path)),
            (path, true) => {
                let path = path
                    .or_else(|| self.config.chrome_bookmarks_file.clone())
                    .or_else(ChromeBookmarksFile::default_location)
                    .ok_or_else(|| ShelfError::ConfigError {
                        message: "cannot locate Chrome bookmarks; set chrome_bookmarks_file"
                            .to_string(),
                    })?;
                Box::new(ChromeBookmarksFile::new(path))
            }
            (None, false) => {
                return Err(ShelfError::ApplicationError {
                    message: "Specify a bookmark tree file or --chrome".to_string(),
                })
            }
        };

        let imported = import_from(source.as_ref())?;

        self.store.lock().await.store_import(&imported)?;

        println!(
            "Imported {} bookmarks and {} folders.",
            imported.links.len(),
            imported.folders.len()
        );
        Ok(())
    }

    async fn handle_export(&self, output: Option<PathBuf>) -> Result<()> {
        let path = output.unwrap_or_else(|| {
            self.config
                .export_dir
                .join(export_file_name(Local::now().date_naive()))
        });

        let store = self.store.lock().await;
        let path = export_to_file(&store, &self.config.search_shortcut, &path)?;
        println!("Configuration exported to {}", path.display());
        Ok(())
    }

    async fn handle_restore(&self, file: PathBuf, force: bool) -> Result<()> {
        let exported = ExportedConfig::read(&file)?;

        if !force {
            println!(
                "Restoring {} replaces all links and folders with {} links and {} folders.",
                file.display(),
                exported.links.len(),
                exported.folders.len()
            );
            if !confirm("Continue?")? {
                println!("Restore cancelled.");
                return Ok(());
            }
        }

        let summary = restore(&*self.store.lock().await, exported)?;

        if let Some(shortcut) = &summary.shortcut {
            let mut config = self.config.clone();
            config.search_shortcut = shortcut.clone();
            config.save(&self.config_path)?;
            println!("Search shortcut set to {}", config.search_shortcut);
        }

        println!(
            "Restored {} links and {} folders.",
            summary.total_links, summary.total_folders
        );
        for (id, message) in &summary.failed_records {
            println!("  failed {}: {}", id, message);
        }
        Ok(())
    }

    async fn handle_clear(&self, force: bool) -> Result<()> {
        if !force && !confirm("Delete every link and folder? This cannot be undone.")? {
            println!("Nothing was deleted.");
            return Ok(());
        }

        self.store.lock().await.clear()?;
        println!("All data cleared.");
        Ok(())
    }

    fn handle_shortcut(&self, command: ShortcutCommands) -> Result<()> {
        match command {
            ShortcutCommands::Show => {
                let registry = default_shortcuts(&self.config.search_shortcut);
                println!(
                    "Search: {}",
                    console::style(registry.search_shortcut()).bold()
                );
                for command in registry.commands() {
                    println!("{:<14} {}", command.keys.to_string(), command.description);
                }
            }
            ShortcutCommands::Set { combo } => {
                let parsed: ShortcutKeys = combo.parse()?;
                let recorded = ShortcutKeys::record(&parsed.to_event())?;

                let mut config = self.config.clone();
                config.search_shortcut = recorded;
                config.save(&self.config_path)?;
                println!("Search shortcut updated to {}", config.search_shortcut);
            }
            ShortcutCommands::Check { combo } => {
                let parsed: ShortcutKeys = combo.parse()?;
                let registry = default_shortcuts(&self.config.search_shortcut);
                match registry.dispatch(&parsed.to_event()) {
                    Some(ShortcutMatch::Command(command)) => {
                        println!("{} -> {}", parsed, command.description)
                    }
                    Some(ShortcutMatch::Search) => println!("{} -> Open search", parsed),
                    None => println!("{} is not bound", parsed),
                }
            }
        }
        Ok(())
    }

    fn handle_config(&self, show: bool, set: Option<String>, reset: bool) -> Result<()> {
        if reset {
            Config::default().save(&self.config_path)?;
            println!("Configuration reset to defaults.");
            return Ok(());
        }

        if let Some(assignment) = set {
            let mut config = self.config.clone();
            config.set(&assignment)?;
            config.save(&self.config_path)?;
            println!("Configuration updated.");
            return Ok(());
        }

        if show || self.verbose {
            println!("# {}", self.config_path.display());
        }
        println!("{}", serde_json::to_string_pretty(&self.config)?);
        Ok(())
    }
}

/// Asks a yes/no question on the terminal.
fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N]: ", question);
    stdout().flush().map_err(ShelfError::Io)?;

    let mut input = String::new();
    stdin().read_line(&mut input).map_err(ShelfError::Io)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{}", tag))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display links in JSON format
fn display_links_json(links: &[Link]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(links)?);
    Ok(())
}

/// Display links in text format
fn display_links_text(links: &[Link], verbose: bool) {
    // Use terminal width for formatting if available
    let term_width = terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80);

    for (i, link) in links.iter().enumerate() {
        if i > 0 {
            println!("{}", "-".repeat(term_width.min(50)));
        }

        println!(
            "ID: {} | Created: {} | Opened: {}",
            link.id,
            link.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            link.use_count
        );
        println!("{}", console::style(&link.name).bold());
        println!("{}", console::style(&link.url).underlined());

        if !link.tags.is_empty() {
            println!("Tags: {}", console::style(format_tags(&link.tags)).cyan());
        }

        if let Some(notes) = link.notes.as_deref().filter(|n| !n.is_empty()) {
            if verbose {
                println!("\n{}", notes);
            } else {
                let first_line = notes.lines().next().unwrap_or_default();
                println!("{}", console::style(first_line).dim());
            }
        }
    }
}

fn display_search_results(results: &SearchResults, limit: usize) {
    println!(
        "{} {}",
        console::style(format!("[{}]", results.generation)).dim(),
        console::style(&results.query).bold()
    );
    if results.links.is_empty() {
        println!("  (no matches)");
        return;
    }

    let shown = if limit == 0 {
        results.links.len()
    } else {
        limit.min(results.links.len())
    };
    for link in &results.links[..shown] {
        println!("  {}  {}", link.name, console::style(&link.url).dim());
    }
    if shown < results.links.len() {
        println!("  ... {} more", results.links.len() - shown);
    }
}

fn display_folder_tree(folders: &[Folder], parent: Option<&str>, depth: usize, verbose: bool) {
    for folder in child_folders(folders, parent) {
        let indent = "  ".repeat(depth);
        if verbose {
            println!(
                "{}{} ({} links) [{}]",
                indent,
                console::style(&folder.name).bold(),
                folder.links.len(),
                folder.id
            );
        } else {
            println!("{}{} ({} links)", indent, folder.name, folder.links.len());
        }
        display_folder_tree(folders, Some(&folder.id), depth + 1, verbose);
    }
}
