//! Pruning old snapshots

use crate::error::Result;
use crate::logging::Logger;
use crate::snapshot::{list_snapshots, Snapshot};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What a prune pass did
#[derive(Debug, Clone, Default)]
pub struct PruneOutcome {
    /// Snapshots left in place, newest first
    pub kept: Vec<PathBuf>,
    /// Snapshots deleted
    pub removed: Vec<PathBuf>,
    /// Snapshots that could not be deleted, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

/// Keep the `keep` most recently modified snapshots under `root` and delete
/// the rest.
///
/// Modification time ties fall back to name order. Deletion is best-effort:
/// a snapshot that cannot be removed is logged and recorded in
/// [`PruneOutcome::failed`], and the remaining deletions still run. Only a
/// failure to list `root` is returned as an error.
pub fn prune_snapshots(root: &Path, keep: usize, logger: &dyn Logger) -> Result<PruneOutcome> {
    prune_with(root, keep, logger, |path| fs::remove_dir_all(path))
}

/// [`prune_snapshots`] with the directory removal supplied by the caller
pub(crate) fn prune_with<F>(
    root: &Path,
    keep: usize,
    logger: &dyn Logger,
    mut remove: F,
) -> Result<PruneOutcome>
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let mut snapshots = list_snapshots(root)?;
    sort_newest_first(&mut snapshots);

    if snapshots.len() <= keep {
        logger.debug(format_args!(
            "{} snapshot(s) in {}, nothing to prune (keeping {})",
            snapshots.len(),
            root.display(),
            keep
        ));
        return Ok(PruneOutcome {
            kept: snapshots.into_iter().map(|s| s.path).collect(),
            ..Default::default()
        });
    }

    let expired = snapshots.split_off(keep);

    let mut outcome = PruneOutcome {
        kept: snapshots.into_iter().map(|s| s.path).collect(),
        ..Default::default()
    };

    for snapshot in expired {
        logger.info(format_args!("Removing old backup: {}", snapshot.path.display()));
        match remove(&snapshot.path) {
            Ok(()) => outcome.removed.push(snapshot.path),
            Err(e) => {
                logger.error(format_args!(
                    "Failed to remove backup {}: {}",
                    snapshot.path.display(),
                    e
                ));
                outcome.failed.push((snapshot.path, e.to_string()));
            }
        }
    }

    Ok(outcome)
}

fn sort_newest_first(snapshots: &mut [Snapshot]) {
    snapshots.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
}
