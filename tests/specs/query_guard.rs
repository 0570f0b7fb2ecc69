//! S5 — query guard: `clankers query` rejects anything but a bare
//! `SELECT`/`WITH` statement, and lets ordinary reads through.

use crate::prelude::*;

#[test]
fn a_mutating_statement_is_rejected() {
    let root = tempfile::tempdir().expect("tempdir");
    let daemon = spawn_daemon(root.path());

    clankers_cli()
        .arg("query")
        .arg("DELETE FROM sessions")
        .arg("--db-path")
        .arg(&daemon.db_path)
        .assert()
        .failure();
}

#[tokio::test]
async fn a_select_statement_returns_rows() {
    let root = tempfile::tempdir().expect("tempdir");
    let daemon = spawn_daemon(root.path());
    let rpc = daemon.rpc_client();

    rpc.call_entity("upsertSession", "session", &serde_json::json!({"id": "s1"}))
        .await
        .expect("seed a session row");

    let assert = clankers_cli()
        .arg("query")
        .arg("SELECT id FROM sessions")
        .arg("--db-path")
        .arg(&daemon.db_path)
        .arg("--format")
        .arg("json")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("s1"), "expected row for s1 in output, got: {stdout}");
}
