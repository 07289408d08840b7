//! Snapshot naming and discovery

use crate::error::{Error, Result};
use chrono::{DateTime, Local, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Every snapshot directory name starts with this
pub const SNAPSHOT_PREFIX: &str = "WTF_Backup_";

/// Fixed-width, zero-padded, most-significant-field-first. Lexicographic
/// order of the formatted names is chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// A backup directory below a backup root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Directory name, e.g. `WTF_Backup_2024-05-01_21-30-00`
    pub name: String,
    /// Full path of the directory
    pub path: PathBuf,
    /// Filesystem modification time of the directory
    pub modified: SystemTime,
}

impl Snapshot {
    /// Creation time encoded in the name, if it parses
    pub fn timestamp(&self) -> Option<DateTime<Local>> {
        let stamp = self.name.strip_prefix(SNAPSHOT_PREFIX)?;
        let naive = chrono::NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
        Local.from_local_datetime(&naive).earliest()
    }
}

/// Directory name for a snapshot taken at `time`
pub fn snapshot_name<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}{}", SNAPSHOT_PREFIX, time.format(TIMESTAMP_FORMAT))
}

/// Whether a directory name carries the snapshot prefix
pub fn is_snapshot_name(name: &str) -> bool {
    name.starts_with(SNAPSHOT_PREFIX)
}

/// All snapshot directories directly under `root`, in no particular order.
///
/// Plain files and directories without the prefix are ignored.
pub fn list_snapshots(root: &Path) -> Result<Vec<Snapshot>> {
    let traversal_failed = |source: std::io::Error| Error::TraversalFailed {
        path: root.to_path_buf(),
        source,
    };

    let mut snapshots = Vec::new();
    for entry in fs::read_dir(root).map_err(traversal_failed)? {
        let entry = entry.map_err(traversal_failed)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_snapshot_name(&name) {
            continue;
        }

        let metadata = entry.metadata().map_err(traversal_failed)?;
        if !metadata.is_dir() {
            continue;
        }

        snapshots.push(Snapshot {
            name,
            path: entry.path(),
            modified: metadata.modified().map_err(traversal_failed)?,
        });
    }

    Ok(snapshots)
}
