// SPDX-License-Identifier: MIT

//! Codex CLI adapter: tails Codex's event-queue JSONL (one `Event{id, msg}`
//! envelope per line, `msg.type` internally tagged) and feeds assistant
//! text/token events through the message finalizer. Event shapes are
//! Codex's own, not this project's.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use clankers_client::{FinalizerContext, MetadataUpdate, Part, RpcClient};
use clankers_core::Session;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::watch::LineHandler;

#[derive(Debug, Clone, Deserialize)]
struct Event {
    id: String,
    msg: EventMsg,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EventMsg {
    SessionConfigured(SessionConfiguredEvent),
    AgentMessage(AgentMessageEvent),
    AgentMessageDelta(AgentMessageDeltaEvent),
    TaskComplete(TaskCompleteEvent),
    TokenCount(TokenUsage),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
struct SessionConfiguredEvent {
    session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AgentMessageEvent {
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AgentMessageDeltaEvent {
    delta: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TaskCompleteEvent {
    #[serde(default)]
    last_agent_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct TokenUsage {
    input_tokens: i64,
    output_tokens: i64,
}

pub struct CodexAdapter {
    rpc: RpcClient,
    finalizer: Arc<FinalizerContext>,
    session_id: String,
    /// Accumulated text per submission id, since the finalizer's own part
    /// storage replaces rather than appends on each `stage_part` call.
    buffers: HashMap<String, String>,
}

impl CodexAdapter {
    pub fn new(rpc: RpcClient, session_id: impl Into<String>) -> Self {
        Self {
            rpc,
            finalizer: FinalizerContext::new(),
            session_id: session_id.into(),
            buffers: HashMap::new(),
        }
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
                    source: Some("codex".to_string()),
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

    /// Appends `text` to the submission's running buffer and republishes
    /// the full accumulated text as the part's content.
    fn append_text(&mut self, submission_id: &str, text: &str) {
        let buffer = self.buffers.entry(submission_id.to_string()).or_default();
        buffer.push_str(text);
        let full_text = buffer.clone();
        self.publish_text(submission_id, full_text);
    }

    /// Replaces the submission's buffer outright, for events that carry the
    /// full message text rather than an incremental delta.
    fn replace_text(&mut self, submission_id: &str, text: String) {
        self.buffers.insert(submission_id.to_string(), text.clone());
        self.publish_text(submission_id, text);
    }

    fn publish_text(&self, submission_id: &str, text: String) {
        let _ = self.finalizer.stage_metadata(MetadataUpdate {
            id: submission_id.to_string(),
            session_id: self.session_id.clone(),
            role: Some(clankers_core::Role::Assistant),
            info: json!({}),
        });
        self.finalizer.stage_part(Part {
            message_id: submission_id.to_string(),
            part_type: "text".to_string(),
            text,
        });
    }
}

#[async_trait]
impl LineHandler for CodexAdapter {
    async fn handle_line(&mut self, line: &str) {
        let event: Event = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                debug!("skipping malformed codex event: {e}");
                return;
            }
        };
        match event.msg {
            EventMsg::SessionConfigured(configured) => {
                self.session_id = configured.session_id;
            }
            EventMsg::AgentMessageDelta(delta) => {
                self.append_text(&event.id, &delta.delta);
            }
            EventMsg::AgentMessage(message) => {
                self.replace_text(&event.id, message.message);
                self.buffers.remove(&event.id);
                self.finalizer.schedule_finalize(event.id, self.sink());
            }
            EventMsg::TaskComplete(complete) => {
                if let Some(text) = complete.last_agent_message {
                    self.replace_text(&event.id, text);
                }
                self.buffers.remove(&event.id);
                self.finalizer.schedule_finalize(event.id, self.sink());
            }
            EventMsg::TokenCount(tokens) => {
                let session = Session {
                    id: self.session_id.clone(),
                    prompt_tokens: Some(tokens.input_tokens),
                    completion_tokens: Some(tokens.output_tokens),
                    ..Session::default()
                };
                let _ = self.rpc.call_entity("upsertSession", "session", &session).await;
            }
            EventMsg::Other => debug!("unhandled codex event for submission {}", event.id),
        }
    }
}

#[cfg(test)]
#[path = "codex_tests.rs"]
mod tests;
