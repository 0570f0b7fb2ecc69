// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("io error watching {0}: {1}")]
    Io(std::path::PathBuf, std::io::Error),
    #[error("failed to install a filesystem watcher on {0}: {1}")]
    WatchFailed(std::path::PathBuf, notify::Error),
    #[error("malformed event line: {0}")]
    MalformedLine(String),
    #[error(transparent)]
    Finalize(#[from] clankers_client::FinalizeError),
}
