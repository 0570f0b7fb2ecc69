//! S4 — role inference: a finalized message whose metadata never reported a
//! role falls back to a heuristic read of its text. Exercised through the
//! finalizer's public surface (the one place role inference actually runs)
//! rather than by calling the heuristic directly, since it is private to
//! `clankers-client`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use clankers_client::{FinalizedMessage, FinalizerContext, MetadataUpdate, Part};
use clankers_core::Role;

async fn finalize_one(text: &str) -> Role {
    let finalizer = FinalizerContext::new();
    finalizer
        .stage_metadata(MetadataUpdate {
            id: "m1".to_string(),
            session_id: "s1".to_string(),
            role: None,
            info: serde_json::Value::Null,
        })
        .expect("stage metadata");
    finalizer.stage_part(Part {
        message_id: "m1".to_string(),
        part_type: "text".to_string(),
        text: text.to_string(),
    });

    let captured: Arc<Mutex<Option<FinalizedMessage>>> = Arc::new(Mutex::new(None));
    let sink_captured = Arc::clone(&captured);
    finalizer.schedule_finalize(
        "m1".to_string(),
        Arc::new(move |message| {
            let captured = Arc::clone(&sink_captured);
            Box::pin(async move {
                *captured.lock().expect("lock captured") = Some(message);
            })
        }),
    );

    tokio::time::advance(Duration::from_millis(900)).await;
    tokio::task::yield_now().await;

    captured.lock().expect("lock captured").take().expect("sink ran").role
}

#[tokio::test(start_paused = true)]
async fn an_assistant_style_opener_infers_assistant() {
    assert_eq!(finalize_one("I'll refactor this function.").await, Role::Assistant);
}

#[tokio::test(start_paused = true)]
async fn a_question_infers_user() {
    assert_eq!(finalize_one("Can you show me the file?").await, Role::User);
}

#[tokio::test(start_paused = true)]
async fn a_long_unmarked_passage_infers_assistant() {
    let long_text = "x".repeat(800);
    assert_eq!(finalize_one(&long_text).await, Role::Assistant);
}
