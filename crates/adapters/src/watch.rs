// SPDX-License-Identifier: MIT

//! Shared watch loop: a filesystem watcher wakes the loop on each write,
//! with a periodic poll as a fallback (some editors/CLIs rename-and-replace
//! rather than append, which certain platforms don't report as a write to
//! the watched path). Each wake re-tails the log and hands new lines to an
//! adapter-specific handler.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::AdapterError;
use crate::tailer::LineTailer;

const POLL_FALLBACK: Duration = Duration::from_millis(500);

#[async_trait]
pub trait LineHandler: Send {
    async fn handle_line(&mut self, line: &str);
}

/// Runs until `cancel` fires, tailing `log_path` and feeding each new
/// complete line to `handler`.
pub async fn run<H: LineHandler>(
    log_path: PathBuf,
    mut handler: H,
    cancel: CancellationToken,
) -> Result<(), AdapterError> {
    let mut tailer = LineTailer::new(log_path.clone());
    let (fs_tx, mut fs_rx) = mpsc::channel(16);
    let _watcher = spawn_fs_watcher(&log_path, fs_tx)?;
    let mut poll = tokio::time::interval(POLL_FALLBACK);

    drain_and_handle(&mut tailer, &mut handler).await?;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = fs_rx.recv() => {}
            _ = poll.tick() => {}
        }
        drain_and_handle(&mut tailer, &mut handler).await?;
    }
    Ok(())
}

async fn drain_and_handle<H: LineHandler>(
    tailer: &mut LineTailer,
    handler: &mut H,
) -> Result<(), AdapterError> {
    for line in tailer.poll()? {
        handler.handle_line(&line).await;
    }
    Ok(())
}

fn spawn_fs_watcher(path: &Path, tx: mpsc::Sender<()>) -> Result<RecommendedWatcher, AdapterError> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if res.is_ok() {
            let _ = tx.try_send(());
        }
    })
    .map_err(|e| AdapterError::WatchFailed(path.to_path_buf(), e))?;

    let watch_target = path.parent().unwrap_or(path);
    if let Err(e) = watcher.watch(watch_target, RecursiveMode::NonRecursive) {
        warn!(path = %path.display(), "falling back to polling only: {e}");
    }
    Ok(watcher)
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
