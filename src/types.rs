//! Shared result types and the command-line command tree.
use std::path::PathBuf;

use clap::Subcommand;

use crate::{ShelfError, ShortcutKeys, SortBy};

/// A specialized Result type for shelfmark operations.
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Summary of a settings restore
#[derive(Debug, Clone)]
pub struct RestoreSummary {
    /// Number of links found in the document
    pub total_links: usize,
    /// Number of folders found in the document
    pub total_folders: usize,
    /// Records that could not be stored
    pub failed_records: Vec<(String, String)>, // (record_id, error_message)
    /// Shortcut carried by the document, if any
    pub shortcut: Option<ShortcutKeys>,
}

/// Available subcommands for the shelfmark application
#[derive(Subcommand)]
pub enum Commands {
    /// Add a new link
    Add {
        /// URL of the link
        url: String,

        /// Display name (defaults to the URL)
        #[clap(short = 'N', long)]
        name: Option<String>,

        /// Notes for the link
        #[clap(short, long)]
        notes: Option<String>,

        /// Tags to associate with the link (comma-separated)
        #[clap(short, long)]
        tags: Option<String>,

        /// Folder to file the link into
        #[clap(short, long)]
        folder: Option<String>,
    },

    /// List links with optional filtering
    List {
        /// Only show links carrying all of these tags (repeatable)
        #[clap(short, long)]
        tag: Vec<String>,

        /// Only show links in this folder
        #[clap(short, long)]
        folder: Option<String>,

        /// Sort order
        #[clap(short, long, value_enum, default_value_t = SortBy::Created)]
        sort: SortBy,

        /// Limit the number of links returned (0 shows all)
        #[clap(short = 'n', long, default_value_t = 0)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Search links by name, URL, notes and tags
    Search {
        /// Search query text
        query: String,

        /// Limit the number of search results (defaults to the configured limit)
        #[clap(short = 'n', long)]
        limit: Option<usize>,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Interactive search: every line read from stdin is a new query
    Find,

    /// Open a link: bumps its use count and prints the URL
    Open {
        /// ID of the link to open
        id: String,
    },

    /// Edit an existing link
    Edit {
        /// ID of the link to edit
        id: String,

        /// New display name
        #[clap(short = 'N', long)]
        name: Option<String>,

        /// New URL
        #[clap(short, long)]
        url: Option<String>,

        /// New notes
        #[clap(short, long)]
        notes: Option<String>,

        /// Replace tags (comma-separated)
        #[clap(short, long)]
        tags: Option<String>,
    },

    /// Delete a link by ID
    Delete {
        /// ID of the link to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Tag operations (add, remove, list)
    Tag {
        /// ID of the link to modify
        id: String,

        /// Tags to add (comma-separated)
        #[clap(short, long)]
        add: Option<String>,

        /// Tags to remove (comma-separated)
        #[clap(short, long)]
        remove: Option<String>,

        /// List all tags for the link
        #[clap(short, long)]
        list: bool,
    },

    /// Folder operations
    Folder {
        #[clap(subcommand)]
        command: FolderCommands,
    },

    /// Import bookmarks from the browser
    Import {
        /// Bookmark tree file in the browser API shape
        source: Option<PathBuf>,

        /// Read Chrome's profile bookmarks file instead
        #[clap(long)]
        chrome: bool,
    },

    /// Export links, folders and the search shortcut to a JSON file
    Export {
        /// Path of the exported file (default: export directory, dated name)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all data with the contents of an exported file
    Restore {
        /// Path to the exported file
        file: PathBuf,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Delete every link and folder
    Clear {
        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Search shortcut management
    Shortcut {
        #[clap(subcommand)]
        command: ShortcutCommands,
    },

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Update a configuration setting (key=value)
        #[clap(short, long)]
        set: Option<String>,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}

/// Folder subcommands
#[derive(Subcommand)]
pub enum FolderCommands {
    /// Create a folder
    Create {
        /// Folder name
        name: String,

        /// Parent folder ID
        #[clap(short, long)]
        parent: Option<String>,
    },

    /// Show the folder tree
    List {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Rename a folder
    Rename {
        /// ID of the folder
        id: String,

        /// New name
        name: String,
    },

    /// Move a folder under another one (or to the top level)
    Move {
        /// ID of the folder
        id: String,

        /// New parent folder ID; omit for top level
        #[clap(short, long)]
        parent: Option<String>,
    },

    /// Delete a folder and all folders below it
    Delete {
        /// ID of the folder
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Put a link into a folder
    AddLink {
        /// ID of the folder
        folder: String,

        /// ID of the link
        link: String,
    },

    /// Take a link out of a folder
    RemoveLink {
        /// ID of the folder
        folder: String,

        /// ID of the link
        link: String,
    },

    /// Set sibling order: folders are numbered in the order given
    Reorder {
        /// Folder IDs in their new order
        ids: Vec<String>,
    },
}

/// Shortcut subcommands
#[derive(Subcommand)]
pub enum ShortcutCommands {
    /// Show the search shortcut and the built-in commands
    Show,

    /// Set the search shortcut, e.g. `Ctrl+Alt+F`
    Set {
        /// Key combination
        combo: String,
    },

    /// Report what a key combination would trigger
    Check {
        /// Key combination
        combo: String,
    },
}
