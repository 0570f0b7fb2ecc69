// SPDX-License-Identifier: MIT

//! Path resolution for the daemon's data directory, database file, config
//! file, transport endpoint, and log directory.
//!
//! All paths are resolved lazily on each call from the current process
//! environment; nothing here is cached, so tests can flip an env var
//! between calls without reconstructing anything.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("could not determine a home/app-data directory for this platform")]
    NoDataRoot,
}

/// Resolves every filesystem location the daemon and its clients need.
///
/// A plain zero-sized handle — construct one per call site, it holds no
/// state of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl PathResolver {
    pub fn new() -> Self {
        Self
    }

    /// `CLANKERS_DATA_PATH` if set; else the OS application-data root.
    pub fn data_root(&self) -> Result<PathBuf, PathError> {
        if let Ok(dir) = std::env::var("CLANKERS_DATA_PATH") {
            return Ok(PathBuf::from(dir));
        }
        dirs::data_dir().ok_or(PathError::NoDataRoot)
    }

    /// `<data root>/clankers`.
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_root()?.join("clankers"))
    }

    /// `CLANKERS_DB_PATH` if set; else `<data dir>/clankers.db`.
    pub fn db_path(&self) -> Result<PathBuf, PathError> {
        if let Ok(path) = std::env::var("CLANKERS_DB_PATH") {
            return Ok(PathBuf::from(path));
        }
        Ok(self.data_dir()?.join("clankers.db"))
    }

    /// `<data dir>/clankers.json`.
    pub fn config_path(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("clankers.json"))
    }

    /// `CLANKERS_SOCKET_PATH` if set; else the per-OS default transport path.
    pub fn socket_path(&self) -> Result<PathBuf, PathError> {
        if let Ok(path) = std::env::var("CLANKERS_SOCKET_PATH") {
            return Ok(PathBuf::from(path));
        }
        if cfg!(windows) {
            Ok(PathBuf::from(r"\\.\pipe\dxta-clankers"))
        } else {
            Ok(self.data_dir()?.join("dxta-clankers.sock"))
        }
    }

    /// `CLANKERS_LOG_PATH` if set; else the data dir.
    pub fn log_dir(&self) -> Result<PathBuf, PathError> {
        if let Ok(path) = std::env::var("CLANKERS_LOG_PATH") {
            return Ok(PathBuf::from(path));
        }
        self.data_dir()
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
