//! Error types for the shelfmark application.
//!
//! This module defines custom error types that categorize the failures that
//! can occur while storing, importing and searching bookmarks.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the shelfmark application.
#[derive(Error, Debug)]
pub enum ShelfError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The external bookmark source could not be read. The reason is kept
    /// for logging; users only ever see "import failed".
    #[error("import failed")]
    ImportFailure { reason: String },

    /// Link was not found when performing an operation.
    #[error("Link not found: {id}")]
    LinkNotFound { id: String },

    /// Folder was not found when performing an operation.
    #[error("Folder not found: {id}")]
    FolderNotFound { id: String },

    /// Link with the same ID already exists.
    #[error("Link already exists: {id}")]
    LinkAlreadyExists { id: String },

    /// Folder with the same ID already exists.
    #[error("Folder already exists: {id}")]
    FolderAlreadyExists { id: String },

    /// Invalid record or file format.
    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// Mutex lock acquisition issues
    #[error("{message}")]
    LockAcquisitionFailed { message: String },

    /// file not found
    #[error("File not found: {file_path}")]
    FileNotFound { file_path: String },

    /// A recorded or parsed shortcut is not usable.
    #[error("Invalid shortcut: {message}")]
    InvalidShortcut { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}

impl ShelfError {
    pub(crate) fn import_failure(reason: impl Into<String>) -> Self {
        ShelfError::ImportFailure {
            reason: reason.into(),
        }
    }
}
