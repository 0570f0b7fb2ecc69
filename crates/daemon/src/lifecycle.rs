// SPDX-License-Identifier: MIT

//! Daemon startup and shutdown orchestration (§4.6): lock acquisition,
//! database open, logger init, listener bind. Signal handling lives in
//! `main.rs`, which owns the process's top-level cancellation.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use clankers_core::{LogLevel, PathResolver, SystemClock};
use clankers_store::Store;
use fs2::FileExt;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::dispatcher::Dispatcher;
use crate::error::LifecycleError;
use crate::logger::Logger;

/// Optional overrides from `clankersd`'s command line (§4.6); unset fields
/// fall back to `clankers_core::PathResolver` / `CLANKERS_LOG_LEVEL`.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub socket: Option<PathBuf>,
    pub data_root: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
}

/// Resolved filesystem locations for one daemon run.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: LogLevel,
}

impl Config {
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, LifecycleError> {
        if let Some(data_root) = &overrides.data_root {
            std::env::set_var("CLANKERS_DATA_PATH", data_root);
        }
        let resolver = PathResolver::new();
        let data_dir = resolver.data_dir()?;
        let db_path = match overrides.db_path {
            Some(path) => path,
            None => resolver.db_path()?,
        };
        let socket_path = match overrides.socket {
            Some(path) => path,
            None => resolver.socket_path()?,
        };
        let log_dir = resolver.log_dir()?;
        let lock_path = data_dir.join("clankers.lock");
        let log_level = overrides
            .log_level
            .or_else(|| std::env::var("CLANKERS_LOG_LEVEL").ok().and_then(|s| s.parse().ok()))
            .unwrap_or_default();
        Ok(Self { data_dir, db_path, socket_path, lock_path, log_dir, log_level })
    }
}

/// A running daemon: holds the exclusive lock file (released on `Drop`) and
/// every handle needed to serve requests and shut down cleanly.
pub struct Daemon {
    config: Config,
    #[allow(dead_code)] // held only for its Drop-released exclusive lock
    lock_file: std::fs::File,
    dispatcher: Arc<Dispatcher<SystemClock>>,
    cancel: CancellationToken,
}

impl Daemon {
    /// Startup sequence (§4.6): acquire the lock, open the store, start the
    /// logger's retention sweeper. The listener itself is bound by `run`,
    /// which is the last step and the one that blocks until cancellation.
    pub async fn start(config: Config) -> Result<Self, LifecycleError> {
        std::fs::create_dir_all(&config.data_dir)?;

        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&config.lock_path)?;
        lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
        let mut lock_file = lock_file;
        lock_file.set_len(0)?;
        writeln!(lock_file, "{}", std::process::id())?;

        let (store, created) = Store::ensure_db(&config.db_path)?;
        if created {
            info!(path = %config.db_path.display(), "created database");
        }

        let logger = Arc::new(Logger::new(config.log_dir.clone(), config.log_level));
        logger.spawn_retention_sweeper();

        let dispatcher =
            Arc::new(Dispatcher::new(Arc::new(store), logger, config.db_path.clone(), created));

        Ok(Self { config, lock_file, dispatcher, cancel: CancellationToken::new() })
    }

    /// A clone of the token that `shutdown` cancels; signal handlers should
    /// hold onto this to trigger the accept loop's drain-and-exit.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the accept loop until cancelled. Returns once the listener has
    /// drained its in-flight connections.
    pub async fn run(&self) -> Result<(), LifecycleError> {
        crate::listener::run(&self.config.socket_path, Arc::clone(&self.dispatcher), self.cancel.clone())
            .await
    }

    /// Best-effort cleanup, mirroring each step independently rather than
    /// aborting on the first failure.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                tracing::warn!("failed to remove socket file: {e}");
            }
        }
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                tracing::warn!("failed to remove lock file: {e}");
            }
        }
        info!("daemon shutdown complete");
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
