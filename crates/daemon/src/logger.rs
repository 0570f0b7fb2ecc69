// SPDX-License-Identifier: MIT

//! Rotating JSONL logger (§4.3): one file per UTC calendar day, daemon-side
//! level filtering, line-atomic writes, 30-day retention.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use clankers_core::{LogEntry, LogLevel};
use parking_lot::Mutex;
use tracing::warn;

const RETENTION_DAYS: i64 = 30;
const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

type DateFn = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Owns the currently-open log file and rotates it when `date_fn()` advances
/// past the open file's date. `date_fn` defaults to the real UTC date; tests
/// inject a fake one via `with_date_fn` so rotation/retention don't need to
/// sleep past real midnight.
pub struct Logger {
    dir: PathBuf,
    min_level: LogLevel,
    date_fn: DateFn,
    open: Mutex<Option<(NaiveDate, BufWriter<File>)>>,
}

impl Logger {
    pub fn new(dir: PathBuf, min_level: LogLevel) -> Self {
        Self::with_date_fn(dir, min_level, || Utc::now().date_naive())
    }

    pub fn with_date_fn(
        dir: PathBuf,
        min_level: LogLevel,
        date_fn: impl Fn() -> NaiveDate + Send + Sync + 'static,
    ) -> Self {
        Self { dir, min_level, date_fn: Box::new(date_fn), open: Mutex::new(None) }
    }

    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("clankers-{}.jsonl", date.format("%Y-%m-%d")))
    }

    /// Entries below the configured minimum level are dropped before
    /// serialization — they never reach disk.
    pub fn write_entry(&self, entry: &LogEntry) -> std::io::Result<()> {
        if entry.level < self.min_level {
            return Ok(());
        }
        fs::create_dir_all(&self.dir)?;
        let today = (self.date_fn)();
        let mut guard = self.open.lock();
        let needs_rotation = !matches!(&*guard, Some((date, _)) if *date == today);
        if needs_rotation {
            let file = OpenOptions::new().create(true).append(true).open(self.path_for(today))?;
            *guard = Some((today, BufWriter::new(file)));
        }
        let (_, writer) = guard.as_mut().unwrap_or_else(|| unreachable!("just inserted above"));
        serde_json::to_writer(&mut *writer, entry)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Deletes `clankers-*.jsonl` files whose filename date is more than
    /// [`RETENTION_DAYS`] before today.
    pub fn sweep_retention(&self) -> std::io::Result<()> {
        let cutoff = (self.date_fn)() - ChronoDuration::days(RETENTION_DAYS);
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(date) = parse_log_date(&name.to_string_lossy()) else { continue };
            if date < cutoff {
                let _ = fs::remove_file(entry.path());
            }
        }
        Ok(())
    }

    /// Runs the sweep immediately and then every 24h, alongside the
    /// accept loop, for the lifetime of the daemon process.
    pub fn spawn_retention_sweeper(self: &Arc<Self>) {
        let logger = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                if let Err(e) = logger.sweep_retention() {
                    warn!("log retention sweep failed: {e}");
                }
            }
        });
    }
}

fn parse_log_date(filename: &str) -> Option<NaiveDate> {
    let stem = filename.strip_prefix("clankers-")?.strip_suffix(".jsonl")?;
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
