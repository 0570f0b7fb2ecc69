// SPDX-License-Identifier: MIT

use std::sync::Arc;

use chrono::NaiveDate;
use clankers_core::{LogEntry, LogLevel};
use parking_lot::Mutex;
use tempfile::tempdir;

use super::*;

fn entry(level: LogLevel, message: &str) -> LogEntry {
    LogEntry {
        timestamp: None,
        level,
        component: None,
        message: message.to_string(),
        request_id: None,
        context: None,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_else(|| unreachable!("valid test date"))
}

#[test]
fn entries_below_min_level_write_no_bytes() {
    let dir = tempdir().unwrap();
    let logger = Logger::with_date_fn(dir.path().to_path_buf(), LogLevel::Warn, move || date(2026, 1, 1));
    logger.write_entry(&entry(LogLevel::Info, "ignored")).unwrap();
    assert!(!dir.path().join("clankers-2026-01-01.jsonl").exists());
}

#[test]
fn entries_at_or_above_min_level_are_written_as_one_line_each() {
    let dir = tempdir().unwrap();
    let logger = Logger::with_date_fn(dir.path().to_path_buf(), LogLevel::Info, move || date(2026, 1, 1));
    logger.write_entry(&entry(LogLevel::Info, "first")).unwrap();
    logger.write_entry(&entry(LogLevel::Error, "second")).unwrap();

    let contents = std::fs::read_to_string(dir.path().join("clankers-2026-01-01.jsonl")).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("\"first\""));
    assert!(lines[1].contains("\"second\""));
}

#[test]
fn writes_straddling_midnight_land_in_two_dated_files() {
    let dir = tempdir().unwrap();
    let current = Arc::new(Mutex::new(date(2026, 1, 31)));
    let current_for_closure = Arc::clone(&current);
    let logger = Logger::with_date_fn(dir.path().to_path_buf(), LogLevel::Info, move || {
        *current_for_closure.lock()
    });

    logger.write_entry(&entry(LogLevel::Info, "before midnight")).unwrap();
    *current.lock() = date(2026, 2, 1);
    logger.write_entry(&entry(LogLevel::Info, "after midnight")).unwrap();

    let before = std::fs::read_to_string(dir.path().join("clankers-2026-01-31.jsonl")).unwrap();
    let after = std::fs::read_to_string(dir.path().join("clankers-2026-02-01.jsonl")).unwrap();
    assert_eq!(before.lines().count(), 1);
    assert_eq!(after.lines().count(), 1);
}

#[test]
fn retention_sweep_removes_only_files_older_than_the_window() {
    let dir = tempdir().unwrap();
    let logger = Logger::with_date_fn(dir.path().to_path_buf(), LogLevel::Info, move || date(2026, 3, 1));

    std::fs::write(dir.path().join("clankers-2026-01-01.jsonl"), "stale\n").unwrap();
    std::fs::write(dir.path().join("clankers-2026-02-20.jsonl"), "recent\n").unwrap();
    std::fs::write(dir.path().join("not-a-log-file.txt"), "ignored\n").unwrap();

    logger.sweep_retention().unwrap();

    assert!(!dir.path().join("clankers-2026-01-01.jsonl").exists());
    assert!(dir.path().join("clankers-2026-02-20.jsonl").exists());
    assert!(dir.path().join("not-a-log-file.txt").exists());
}

#[test]
fn sweep_on_a_directory_that_does_not_exist_yet_is_a_no_op() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("not-created-yet");
    let logger = Logger::with_date_fn(missing, LogLevel::Info, move || date(2026, 3, 1));
    logger.sweep_retention().unwrap();
}
