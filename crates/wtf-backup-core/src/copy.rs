//! File and directory-tree copying
//!
//! Directory creation happens on the walking thread, in walk order, so a
//! directory always exists before any copy into it is dispatched. File copies
//! run as independent tasks on the rayon pool.

use crate::error::{Error, Result};
use crate::progress::ProgressWriter;
use crate::walk::walk;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Default size of the per-copy transfer buffer
pub const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

/// Totals for one [`FileCopier::copy_tree`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopySummary {
    /// Files copied successfully
    pub files: usize,
    /// Bytes written across all copied files
    pub bytes: u64,
    /// Directories mirrored below the destination root
    pub directories: usize,
}

/// Copies files through a fixed-size buffer
#[derive(Debug, Clone)]
pub struct FileCopier {
    buffer_size: usize,
}

impl Default for FileCopier {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

impl FileCopier {
    /// Create a copier, a zero buffer size falls back to the default
    pub fn new(buffer_size: usize) -> Self {
        let buffer_size = if buffer_size == 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            buffer_size
        };
        Self { buffer_size }
    }

    /// Transfer buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Copy a single file, creating the destination's parent directories.
    ///
    /// An existing destination is truncated. On Unix a newly created
    /// destination gets the source's permission bits. Returns the number of
    /// bytes written.
    pub fn copy_file(&self, src: &Path, dst: &Path, show_progress: bool) -> Result<u64> {
        let copy_failed = |source: io::Error| Error::FileCopyFailed {
            from: src.to_path_buf(),
            to: dst.to_path_buf(),
            source,
        };

        let mut reader = File::open(src).map_err(copy_failed)?;
        let metadata = reader.metadata().map_err(copy_failed)?;

        if let Some(parent) = dst.parent() {
            ensure_dir(parent)?;
        }

        let writer = create_like(dst, &metadata).map_err(copy_failed)?;

        if show_progress {
            let subject = src
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut progress = ProgressWriter::new(writer, metadata.len(), "Copying", subject);
            let bytes = self
                .transfer(&mut reader, &mut progress)
                .map_err(copy_failed)?;
            progress.finish().map_err(copy_failed)?;
            Ok(bytes)
        } else {
            let mut writer = writer;
            let bytes = self.transfer(&mut reader, &mut writer).map_err(copy_failed)?;
            writer.flush().map_err(copy_failed)?;
            Ok(bytes)
        }
    }

    /// Mirror the tree below `src` into `dst`.
    ///
    /// Blocks until every dispatched file copy has finished. A failing copy
    /// does not stop the others; the first failure observed is returned once
    /// all of them are done. Which failure wins when several copies fail at
    /// the same time is not defined.
    pub fn copy_tree(&self, src: &Path, dst: &Path, show_progress: bool) -> Result<CopySummary> {
        fs::metadata(src).map_err(|source| Error::SourceUnavailable {
            path: src.to_path_buf(),
            source,
        })?;
        ensure_dir(dst)?;

        let first_error: OnceLock<Error> = OnceLock::new();
        let files = AtomicUsize::new(0);
        let bytes = AtomicU64::new(0);
        let mut directories = 0usize;

        let error_slot = &first_error;
        let file_count = &files;
        let byte_count = &bytes;

        let walked = rayon::scope(|scope| -> Result<()> {
            for entry in walk(src) {
                let entry = entry?;
                let target = dst.join(&entry.relative);

                if entry.is_dir {
                    ensure_dir(&target)?;
                    directories += 1;
                    continue;
                }

                scope.spawn(move |_| match self.copy_file(&entry.path, &target, show_progress) {
                    Ok(n) => {
                        file_count.fetch_add(1, Ordering::Relaxed);
                        byte_count.fetch_add(n, Ordering::Relaxed);
                    }
                    Err(e) => {
                        tracing::debug!("Copy task failed: {}", e);
                        // Write-once: later failures are dropped
                        let _ = error_slot.set(e);
                    }
                });
            }
            Ok(())
        });

        walked?;
        if let Some(err) = first_error.into_inner() {
            return Err(err);
        }

        Ok(CopySummary {
            files: files.into_inner(),
            bytes: bytes.into_inner(),
            directories,
        })
    }

    fn transfer<R: Read, W: Write>(&self, reader: &mut R, writer: &mut W) -> io::Result<u64> {
        let mut buffer = vec![0u8; self.buffer_size];
        let mut total = 0u64;

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            writer.write_all(&buffer[..n])?;
            total += n as u64;
        }

        Ok(total)
    }
}

/// Create `path` and any missing parents
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::DestinationCreateFailed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn create_like(path: &Path, metadata: &fs::Metadata) -> io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(metadata.permissions().mode())
        .open(path)
}

#[cfg(not(unix))]
fn create_like(path: &Path, _metadata: &fs::Metadata) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
