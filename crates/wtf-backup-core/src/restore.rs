//! Restoring one addon's settings from the latest snapshot

use crate::backup::BackupManager;
use crate::classify::AddonMatcher;
use crate::copy::ensure_dir;
use crate::error::Result;
use crate::walk::walk;
use std::path::{Path, PathBuf};

/// What a restore copied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Snapshot the files came from
    pub snapshot: PathBuf,
    /// Relative paths of the restored files, in walk order
    pub files: Vec<String>,
    /// Total bytes restored
    pub bytes: u64,
}

impl BackupManager {
    /// Copy every file of `addon` from the latest snapshot into `target_root`.
    ///
    /// Files are copied one at a time while walking the snapshot. Folders
    /// are only created where a matching entry needs them, and existing
    /// files are overwritten. An addon with no files in the snapshot
    /// restores nothing and still succeeds.
    pub fn restore_addon(
        &self,
        target_root: &Path,
        addon: &str,
        show_progress: bool,
    ) -> Result<RestoreSummary> {
        let snapshot = self.latest_backup()?;
        let matcher = AddonMatcher::new(addon)?;

        self.logger().info(format_args!(
            "Restoring {} from {}",
            addon, snapshot.name
        ));

        let mut summary = RestoreSummary {
            snapshot: snapshot.path.clone(),
            ..Default::default()
        };

        for entry in walk(&snapshot.path) {
            let entry = entry?;
            let relative = entry.relative_slash();
            if !matcher.matches(&relative) {
                continue;
            }

            let destination = target_root.join(&entry.relative);
            if let Some(parent) = destination.parent() {
                ensure_dir(parent)?;
            }

            if entry.is_dir {
                continue;
            }

            let bytes = self
                .copier()
                .copy_file(&entry.path, &destination, show_progress)?;
            self.logger().info(format_args!("Restored: {}", relative));

            summary.bytes += bytes;
            summary.files.push(relative);
        }

        if summary.files.is_empty() {
            self.logger()
                .warn(format_args!("No files for {} in {}", addon, snapshot.name));
        }

        Ok(summary)
    }
}
