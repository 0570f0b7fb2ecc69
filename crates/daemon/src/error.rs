// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not resolve a data directory: {0}")]
    NoDataDir(#[from] clankers_core::PathError),
    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),
    #[error("failed to bind transport at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),
    #[error("store error: {0}")]
    Store(#[from] clankers_store::StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
