//! # wtf-backup-core
//!
//! Core library for backing up a World of Warcraft `WTF` folder and restoring
//! individual addons' settings from it.
//!
//! This crate provides the foundational functionality for:
//! - Copying a folder tree into a timestamped snapshot with parallel file copies
//! - Deciding which snapshot files belong to an addon
//! - Restoring one addon's files from the most recent snapshot
//! - Pruning old snapshots
//!
//! ## Modules
//!
//! - [`backup`] - Snapshot creation and the [`BackupManager`]
//! - [`classify`] - Addon file matching
//! - [`config`] - `config.yaml` and path normalization
//! - [`copy`] - File and tree copying
//! - [`error`] - Error types and Result alias
//! - [`logging`] - Logger capability
//! - [`progress`] - Per-file progress line
//! - [`restore`] - Addon restore
//! - [`retention`] - Snapshot pruning
//! - [`snapshot`] - Snapshot naming and discovery
//! - [`walk`] - Tree traversal
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use wtf_backup_core::BackupManager;
//!
//! let manager = BackupManager::new("/backups/wow");
//! let info = manager.create_backup(Path::new("/games/wow/_retail_/WTF"), false)?;
//! println!("Created {}", info.name);
//!
//! manager.prune(5)?;
//! manager.restore_addon(Path::new("/games/wow/_retail_/WTF"), "Details", false)?;
//! # Ok::<(), wtf_backup_core::Error>(())
//! ```

pub mod backup;
pub mod classify;
pub mod config;
pub mod copy;
pub mod error;
pub mod logging;
pub mod progress;
pub mod restore;
pub mod retention;
pub mod snapshot;
pub mod walk;

// Error types
pub use error::{Error, Result};

// Configuration
pub use config::{normalize_path, Config};

// Backup, restore, retention
pub use backup::{BackupInfo, BackupManager};
pub use restore::RestoreSummary;
pub use retention::{prune_snapshots, PruneOutcome};
pub use snapshot::{Snapshot, SNAPSHOT_PREFIX};

// Building blocks
pub use classify::AddonMatcher;
pub use copy::{CopySummary, FileCopier};
pub use logging::{Logger, NullLogger, TracingLogger};
pub use progress::ProgressWriter;
