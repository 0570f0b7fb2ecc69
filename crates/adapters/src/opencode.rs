// SPDX-License-Identifier: MIT

//! OpenCode harness adapter: tails `opencode run --format json`'s
//! newline-delimited event stream and feeds it through the message
//! finalizer. Event shapes are OpenCode's own (`step_start`/`text`/
//! `step_finish`), not this project's.

use std::sync::Arc;

use async_trait::async_trait;
use clankers_client::{FinalizerContext, MetadataUpdate, Part, RpcClient};
use clankers_core::Session;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::watch::LineHandler;

#[derive(Debug, Clone, Deserialize)]
struct JsonEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(rename = "sessionID")]
    session_id: String,
    part: JsonPart,
}

#[derive(Debug, Clone, Deserialize)]
struct JsonPart {
    #[serde(rename = "messageID")]
    message_id: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    tokens: Option<JsonTokens>,
}

#[derive(Debug, Clone, Deserialize)]
struct JsonTokens {
    input: i64,
    output: i64,
}

pub struct OpencodeAdapter {
    rpc: RpcClient,
    finalizer: Arc<FinalizerContext>,
}

impl OpencodeAdapter {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc, finalizer: FinalizerContext::new() }
    }

    fn sink(&self) -> clankers_client::Sink {
        let rpc = self.rpc.clone();
        Arc::new(move |message: clankers_client::FinalizedMessage| {
            let rpc = rpc.clone();
            Box::pin(async move {
                let msg = clankers_core::Message {
                    id: message.message_id,
                    session_id: message.session_id,
                    role: message.role,
                    text_content: Some(message.text_content),
                    model: None,
                    source: Some("opencode".to_string()),
                    prompt_tokens: None,
                    completion_tokens: None,
                    duration_ms: None,
                    created_at: None,
                    completed_at: None,
                };
                let _ = rpc.call_entity("upsertMessage", "message", &msg).await;
            })
        })
    }
}

#[async_trait]
impl LineHandler for OpencodeAdapter {
    async fn handle_line(&mut self, line: &str) {
        let event: JsonEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                debug!("skipping malformed opencode event: {e}");
                return;
            }
        };
        match event.event_type.as_str() {
            "step_start" => {
                let _ = self.finalizer.stage_metadata(MetadataUpdate {
                    id: event.part.message_id,
                    session_id: event.session_id,
                    role: None,
                    info: json!({}),
                });
            }
            "text" => {
                if let Some(text) = event.part.text {
                    self.finalizer.stage_part(Part {
                        message_id: event.part.message_id.clone(),
                        part_type: "text".to_string(),
                        text,
                    });
                    self.finalizer.schedule_finalize(event.part.message_id, self.sink());
                }
            }
            "step_finish" => {
                if let Some(tokens) = event.part.tokens {
                    let session = Session {
                        id: event.session_id,
                        prompt_tokens: Some(tokens.input),
                        completion_tokens: Some(tokens.output),
                        ..Session::default()
                    };
                    let _ = self.rpc.call_entity("upsertSession", "session", &session).await;
                }
            }
            other => debug!("unhandled opencode event type: {other}"),
        }
    }
}

#[cfg(test)]
#[path = "opencode_tests.rs"]
mod tests;
