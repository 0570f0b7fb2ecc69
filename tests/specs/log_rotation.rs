//! S6 — log rotation: each `log.write` call lands in today's
//! `clankers-<date>.jsonl` file, one JSON line per entry. The
//! midnight-rotation property itself (a write just before midnight and one
//! just after land in two distinct dated files) is a `clankers-daemon`
//! unit test against an injected clock, since the real daemon binary only
//! ever uses the system clock; this exercises the RPC-to-disk wiring that
//! test can't reach.

use std::time::Duration;

use crate::prelude::*;

fn log_dir(daemon: &DaemonHandle) -> std::path::PathBuf {
    daemon.data_root.join("clankers")
}

#[tokio::test]
async fn log_write_calls_land_as_one_jsonl_line_each_in_todays_file() {
    let root = tempfile::tempdir().expect("tempdir");
    let daemon = spawn_daemon(root.path());
    let rpc = daemon.rpc_client();

    rpc.call_entity("log.write", "entry", &serde_json::json!({"level": "info", "message": "first"}))
        .await
        .expect("first log.write");
    rpc.call_entity("log.write", "entry", &serde_json::json!({"level": "info", "message": "second"}))
        .await
        .expect("second log.write");

    let dir = log_dir(&daemon);
    let found = wait_for(Duration::from_secs(5), || {
        std::fs::read_dir(&dir)
            .map(|mut entries| entries.any(|e| e.is_ok()))
            .unwrap_or(false)
    });
    assert!(found, "expected a log file to appear under {}", dir.display());

    let entry = std::fs::read_dir(&dir).expect("read log dir").next().expect("one log file").expect("dir entry");
    let name = entry.file_name().to_string_lossy().into_owned();
    assert!(name.starts_with("clankers-") && name.ends_with(".jsonl"), "unexpected log file name: {name}");

    let contents = std::fs::read_to_string(entry.path()).expect("read log file");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2, "expected two log lines, got: {contents}");
    assert!(lines[0].contains("\"first\""));
    assert!(lines[1].contains("\"second\""));
}
