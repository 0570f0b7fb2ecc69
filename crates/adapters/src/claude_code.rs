// SPDX-License-Identifier: MIT

//! Claude Code harness adapter: tails the CLI's session transcript JSONL
//! (one JSON object per line, `type`/`message`/`sessionId` keys) and feeds
//! assembled text into the message finalizer.

use std::sync::Arc;

use async_trait::async_trait;
use clankers_client::{FinalizerContext, MetadataUpdate, Part, RpcClient};
use clankers_core::Role;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::watch::LineHandler;

#[derive(Debug, Clone, Deserialize)]
struct TranscriptLine {
    #[serde(rename = "type")]
    line_type: String,
    #[serde(default)]
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
    #[serde(default)]
    message: Option<TranscriptMessage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TranscriptMessage {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

pub struct ClaudeCodeAdapter {
    rpc: RpcClient,
    finalizer: Arc<FinalizerContext>,
    session_id: String,
    next_message_id: u64,
}

impl ClaudeCodeAdapter {
    pub fn new(rpc: RpcClient, session_id: impl Into<String>) -> Self {
        Self { rpc, finalizer: FinalizerContext::new(), session_id: session_id.into(), next_message_id: 0 }
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
                    source: Some("claude-code".to_string()),
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
impl LineHandler for ClaudeCodeAdapter {
    async fn handle_line(&mut self, line: &str) {
        let entry: TranscriptLine = match serde_json::from_str(line) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("skipping malformed transcript line: {e}");
                return;
            }
        };
        let role = match entry.line_type.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => return,
        };
        let session_id = entry.session_id.unwrap_or_else(|| self.session_id.clone());
        self.next_message_id += 1;
        let message_id = format!("{}-{}", session_id, self.next_message_id);

        let _ = self.finalizer.stage_metadata(MetadataUpdate {
            id: message_id.clone(),
            session_id,
            role: Some(role),
            info: json!({}),
        });

        let text = match entry.message {
            Some(TranscriptMessage::Text(text)) => text,
            Some(TranscriptMessage::Blocks(blocks)) => blocks
                .into_iter()
                .filter(|b| b.block_type == "text")
                .filter_map(|b| b.text)
                .collect::<Vec<_>>()
                .join(""),
            None => return,
        };
        if text.is_empty() {
            return;
        }
        self.finalizer.stage_part(Part { message_id: message_id.clone(), part_type: "text".to_string(), text });
        self.finalizer.schedule_finalize(message_id, self.sink());
    }
}

#[cfg(test)]
#[path = "claude_code_tests.rs"]
mod tests;
