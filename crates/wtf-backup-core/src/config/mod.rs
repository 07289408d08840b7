//! Configuration persisted as `config.yaml`

mod paths;

pub use paths::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the configuration, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Configuration for wtf-backup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the WTF folder (backup source, restore target)
    pub wtf_path: PathBuf,
    /// Folder that holds the snapshots
    pub backup_dir: PathBuf,
    /// Addons restored when no single addon is requested
    pub addons: Vec<String>,
}

impl Config {
    /// `config.yaml` in the current working directory
    pub fn default_path() -> PathBuf {
        std::env::current_dir()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Load config from `path`; a missing file gives the empty default
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(Error::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut config: Config =
            serde_yaml::from_str(&content).map_err(|source| Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.normalize();
        Ok(config)
    }

    /// Save config to `path`, creating its folder if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        let write_failed = |source: io::Error| Error::ConfigWrite {
            path: path.to_path_buf(),
            source,
        };

        let mut normalized = self.clone();
        normalized.normalize();

        let content = serde_yaml::to_string(&normalized)
            .map_err(|e| write_failed(io::Error::new(io::ErrorKind::Other, e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }
        fs::write(path, content).map_err(write_failed)?;
        Ok(())
    }

    /// Whether both the WTF folder and the backup folder are set
    pub fn is_complete(&self) -> bool {
        !self.wtf_path.as_os_str().is_empty() && !self.backup_dir.as_os_str().is_empty()
    }

    /// Append addons not yet listed. Names are trimmed and blanks skipped.
    ///
    /// Returns the names actually added, in order.
    pub fn add_addons<I, S>(&mut self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || self.addons.iter().any(|a| a == name) {
                continue;
            }
            self.addons.push(name.to_string());
            added.push(name.to_string());
        }
        added
    }

    /// Remove listed addons. Returns the names actually removed.
    pub fn remove_addons<I, S>(&mut self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if let Some(pos) = self.addons.iter().position(|a| a == name) {
                removed.push(self.addons.remove(pos));
            }
        }
        removed
    }

    fn normalize(&mut self) {
        self.wtf_path = normalize_path(&self.wtf_path.to_string_lossy());
        self.backup_dir = normalize_path(&self.backup_dir.to_string_lossy());
    }
}
