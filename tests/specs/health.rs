//! S1 — health round trip: a freshly started daemon answers `health` with
//! `{ok: true, version: <crate version>}`.

use crate::prelude::*;

#[tokio::test]
async fn health_round_trip_reports_ok_and_version() {
    let root = tempfile::tempdir().expect("tempdir");
    let daemon = spawn_daemon(root.path());
    let rpc = daemon.rpc_client();

    let result = rpc
        .call("health", serde_json::json!({"schemaVersion": 1, "client": {"name": "specs", "version": "0"}}))
        .await
        .expect("health call");

    assert_eq!(result["ok"].as_bool(), Some(true));
    assert_eq!(result["version"].as_str(), Some(env!("CARGO_PKG_VERSION")));
}
