//! S3 — message finalization: staged metadata plus one text part, once the
//! debounce window elapses, finalizes exactly once into a persisted
//! message with the text intact and a role inferred from it (no role was
//! ever reported on the metadata, so the finalizer falls back to
//! `role::infer`).

use std::sync::Arc;
use std::time::Duration;

use clankers_client::{FinalizerContext, MetadataUpdate, Part};
use clankers_core::Role;
use clankers_store::Store;

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn a_staged_message_finalizes_once_with_inferred_role_and_text() {
    let root = tempfile::tempdir().expect("tempdir");
    let daemon = spawn_daemon(root.path());
    let rpc = daemon.rpc_client();

    rpc.call_entity("upsertSession", "session", &serde_json::json!({"id": "s1"}))
        .await
        .expect("create session");

    let finalizer = FinalizerContext::new();
    finalizer
        .stage_metadata(MetadataUpdate {
            id: "m1".to_string(),
            session_id: "s1".to_string(),
            role: Some(Role::Unknown),
            info: serde_json::Value::Null,
        })
        .expect("stage metadata");
    finalizer.stage_part(Part {
        message_id: "m1".to_string(),
        part_type: "text".to_string(),
        text: "Hello".to_string(),
    });

    let sink_rpc = rpc.clone();
    finalizer.schedule_finalize(
        "m1".to_string(),
        Arc::new(move |message| {
            let rpc = sink_rpc.clone();
            Box::pin(async move {
                let payload = serde_json::json!({
                    "id": message.message_id,
                    "sessionId": message.session_id,
                    "role": message.role,
                    "textContent": message.text_content,
                });
                let _ = rpc.call_entity("upsertMessage", "message", &payload).await;
            })
        }),
    );

    tokio::time::advance(Duration::from_millis(900)).await;
    tokio::task::yield_now().await;

    let store = Store::open_read_only(&daemon.db_path).expect("open db read-only");
    let (_session, messages) = store.get_session_by_id("s1").expect("session s1 exists");

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text_content.as_deref(), Some("Hello"));
    assert_eq!(messages[0].role, Role::User);
}
