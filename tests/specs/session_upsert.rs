//! S2 — upsert preservation: a second, partial upsert merges onto the
//! first rather than overwriting it. Fields the second call omits survive
//! from the first.

use clankers_store::Store;

use crate::prelude::*;

#[tokio::test]
async fn a_later_partial_upsert_preserves_earlier_fields() {
    let root = tempfile::tempdir().expect("tempdir");
    let daemon = spawn_daemon(root.path());
    let rpc = daemon.rpc_client();

    rpc.call_entity(
        "upsertSession",
        "session",
        &serde_json::json!({"id": "s1", "title": "T", "model": "m", "createdAt": 100}),
    )
    .await
    .expect("first upsert");

    rpc.call_entity("upsertSession", "session", &serde_json::json!({"id": "s1", "updatedAt": 200}))
        .await
        .expect("second upsert");

    // No RPC getter is exposed for a single session by id — only `clankers
    // query` reads the database directly — so read the row back the same
    // way that command would.
    let store = Store::open_read_only(&daemon.db_path).expect("open db read-only");
    let (session, _messages) = store.get_session_by_id("s1").expect("session s1 exists");

    assert_eq!(session.title.as_deref(), Some("T"));
    assert_eq!(session.model.as_deref(), Some("m"));
    assert_eq!(session.created_at, Some(100));
    assert_eq!(session.updated_at, Some(200));
}
