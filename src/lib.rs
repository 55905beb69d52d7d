//! Shelfmark bookmark manager library
//!
//! This library provides a local store of links and folders, an importer for
//! browser bookmark trees, debounced text search and a keyboard shortcut
//! registry.

mod bookmark_tree;
mod cli;
mod config;
mod debounce;
mod errors;
mod export;
mod folder;
mod helper;
mod importer;
mod link;
mod search;
mod shortcut;
mod storage;
mod types;

// Re-export key components
pub use bookmark_tree::*;
pub use cli::*;
pub use config::*;
pub use debounce::*;
pub use errors::*;
pub use export::*;
pub use folder::*;
pub use helper::*;
pub use importer::*;
pub use link::*;
pub use search::*;
pub use shortcut::*;
pub use storage::*;
pub use types::*;
