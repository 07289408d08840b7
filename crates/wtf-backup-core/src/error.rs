//! Error types for wtf-backup-core

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for backup, restore and config operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot access source {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("Failed to create directory {path}: {source}")]
    DestinationCreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    FileCopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to traverse {path}: {source}")]
    TraversalFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No backups found in {0}")]
    NoBackupsFound(PathBuf),

    #[error("Invalid pattern for addon '{addon}': {source}")]
    InvalidPattern {
        addon: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Result type alias for wtf-backup operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap a walkdir failure, keeping the path it happened at when known
    pub(crate) fn traversal(root: &std::path::Path, err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| root.to_path_buf());
        Error::TraversalFailed {
            path,
            source: err.into(),
        }
    }
}
