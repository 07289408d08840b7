//! Directory tree traversal shared by the copier and the restore walk

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// One entry below a traversal root
#[derive(Debug, Clone)]
pub struct TreeEntry {
    /// Full path on disk
    pub path: PathBuf,
    /// Path relative to the traversal root
    pub relative: PathBuf,
    /// Whether the entry is a directory (symlinks are not followed)
    pub is_dir: bool,
    /// Size in bytes as reported by the entry's own metadata
    pub size: u64,
}

impl TreeEntry {
    /// Relative path with `/` separators regardless of host convention
    pub fn relative_slash(&self) -> String {
        to_slash(&self.relative)
    }
}

/// Lazily walk everything below `root`, parents before their children.
///
/// The root itself is not yielded. Siblings come out in file-name order.
pub fn walk(root: &Path) -> impl Iterator<Item = Result<TreeEntry>> + '_ {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(move |entry| {
            let entry = entry.map_err(|e| Error::traversal(root, e))?;
            let metadata = entry.metadata().map_err(|e| Error::traversal(root, e))?;
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();

            Ok(TreeEntry {
                path: entry.path().to_path_buf(),
                relative,
                is_dir: entry.file_type().is_dir(),
                size: metadata.len(),
            })
        })
}

/// Join the normal components of `path` with `/`
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
