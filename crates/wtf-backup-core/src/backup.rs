//! Creating snapshots of a WTF folder
//!
//! A snapshot is a full copy of the source tree in a directory named
//! `WTF_Backup_<YYYY-MM-DD_HH-MM-SS>` below the backup folder.

use crate::copy::{CopySummary, FileCopier};
use crate::error::{Error, Result};
use crate::logging::{Logger, TracingLogger};
use crate::retention::{prune_snapshots, PruneOutcome};
use crate::snapshot::{list_snapshots, snapshot_name, Snapshot};
use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Poll interval while waiting for a fresh snapshot name
const NAME_RETRY_DELAY: Duration = Duration::from_millis(200);

/// A finished backup
#[derive(Debug, Clone)]
pub struct BackupInfo {
    /// Path to the snapshot directory
    pub path: PathBuf,
    /// Snapshot directory name
    pub name: String,
    /// What was copied
    pub summary: CopySummary,
}

/// Manages snapshot creation, restore and pruning for one backup folder
pub struct BackupManager {
    /// Directory to store snapshots
    backup_dir: PathBuf,
    copier: FileCopier,
    logger: Arc<dyn Logger>,
}

impl BackupManager {
    /// Create a new backup manager logging through `tracing`
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            copier: FileCopier::default(),
            logger: Arc::new(TracingLogger),
        }
    }

    /// Use a different logger
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Use a different copier (e.g. another buffer size)
    pub fn with_copier(mut self, copier: FileCopier) -> Self {
        self.copier = copier;
        self
    }

    /// Get the backup directory
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub(crate) fn copier(&self) -> &FileCopier {
        &self.copier
    }

    pub(crate) fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    /// Copy `source_root` into a new snapshot.
    ///
    /// `source_root` must be an existing directory. If a snapshot with the
    /// current second's name already exists, waits for the next second so
    /// every call produces its own directory.
    pub fn create_backup(&self, source_root: &Path, show_progress: bool) -> Result<BackupInfo> {
        let metadata = fs::metadata(source_root).map_err(|source| Error::SourceUnavailable {
            path: source_root.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(Error::NotADirectory(source_root.to_path_buf()));
        }

        fs::create_dir_all(&self.backup_dir).map_err(|source| Error::DestinationCreateFailed {
            path: self.backup_dir.clone(),
            source,
        })?;

        let (name, path) = self.reserve_snapshot_dir()?;
        self.logger.info(format_args!(
            "Backing up {} to {}",
            source_root.display(),
            path.display()
        ));

        let summary = self.copier.copy_tree(source_root, &path, show_progress)?;
        self.logger.info(format_args!(
            "Backed up {} file(s), {} bytes",
            summary.files,
            summary.bytes
        ));

        Ok(BackupInfo {
            path,
            name,
            summary,
        })
    }

    /// Create the snapshot directory under a name nobody has used yet
    fn reserve_snapshot_dir(&self) -> Result<(String, PathBuf)> {
        loop {
            let name = snapshot_name(&Local::now());
            let path = self.backup_dir.join(&name);

            match fs::create_dir(&path) {
                Ok(()) => return Ok((name, path)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    self.logger
                        .debug(format_args!("{} already exists, waiting for a new timestamp", name));
                    thread::sleep(NAME_RETRY_DELAY);
                }
                Err(source) => return Err(Error::DestinationCreateFailed { path, source }),
            }
        }
    }

    /// All snapshots, newest name first
    pub fn list_backups(&self) -> Result<Vec<Snapshot>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut snapshots = list_snapshots(&self.backup_dir)?;
        snapshots.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(snapshots)
    }

    /// Snapshot with the greatest name
    pub fn latest_backup(&self) -> Result<Snapshot> {
        if let Err(source) = fs::metadata(&self.backup_dir) {
            return Err(Error::SourceUnavailable {
                path: self.backup_dir.clone(),
                source,
            });
        }

        self.list_backups()?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoBackupsFound(self.backup_dir.clone()))
    }

    /// Delete all but the `keep` most recently modified snapshots
    pub fn prune(&self, keep: usize) -> Result<PruneOutcome> {
        prune_snapshots(&self.backup_dir, keep, self.logger.as_ref())
    }
}
