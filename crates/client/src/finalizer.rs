// SPDX-License-Identifier: MIT

//! Message finalizer (§4.8): reassembles one `Message` from metadata and
//! text parts streamed out of order, debouncing bursts of part updates
//! behind an 800ms timer before handing the assembled message to a sink.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use clankers_core::Role;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::error::FinalizeError;
use crate::role;

const DEBOUNCE: Duration = Duration::from_millis(800);

#[derive(Debug, Clone)]
pub struct MetadataUpdate {
    pub id: String,
    pub session_id: String,
    pub role: Option<Role>,
    pub info: Value,
}

#[derive(Debug, Clone)]
pub struct Part {
    pub message_id: String,
    pub part_type: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedMessage {
    pub message_id: String,
    pub session_id: String,
    pub role: Role,
    pub text_content: String,
    pub info: Value,
}

type SinkFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
/// Boxed so adapters can close over an `RpcClient` without the finalizer
/// needing to know about RPC types.
pub type Sink = Arc<dyn Fn(FinalizedMessage) -> SinkFuture + Send + Sync>;

#[derive(Debug, Clone)]
struct Metadata {
    role: Role,
    session_id: String,
    info: Value,
}

#[derive(Default)]
struct Inner {
    metadata: HashMap<String, Metadata>,
    parts_text: HashMap<String, String>,
    finalized: HashSet<String>,
    generations: HashMap<String, u64>,
}

/// One adapter's worth of in-flight message state. Instantiated per
/// adapter rather than kept as module-level globals, so multiple harness
/// watchers can run in the same process without clobbering each other.
#[derive(Default)]
pub struct FinalizerContext {
    inner: Mutex<Inner>,
}

impl FinalizerContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stage_metadata(&self, update: MetadataUpdate) -> Result<(), FinalizeError> {
        if update.id.is_empty() {
            return Err(FinalizeError::MissingId);
        }
        if update.session_id.is_empty() {
            return Err(FinalizeError::MissingSessionId);
        }
        let mut inner = self.inner.lock();
        let entry = inner.metadata.entry(update.id).or_insert_with(|| Metadata {
            role: Role::Unknown,
            session_id: update.session_id.clone(),
            info: Value::Null,
        });
        entry.session_id = update.session_id;
        if let Some(role) = update.role {
            entry.role = role;
        }
        entry.info = update.info;
        Ok(())
    }

    pub fn stage_part(&self, part: Part) {
        if part.part_type != "text" {
            return;
        }
        let mut inner = self.inner.lock();
        inner.parts_text.insert(part.message_id.clone(), part.text);
        inner.metadata.entry(part.message_id).or_insert_with(|| Metadata {
            role: Role::Unknown,
            session_id: String::new(),
            info: Value::Null,
        });
    }

    /// Cancels any pending timer for `id` (by invalidating its generation)
    /// and schedules a fresh one 800ms out. No `JoinHandle` bookkeeping is
    /// needed: a stale task simply finds its generation superseded on wake
    /// and no-ops, so the latest call always wins.
    pub fn schedule_finalize(self: &Arc<Self>, id: String, sink: Sink) {
        let generation = {
            let mut inner = self.inner.lock();
            let slot = inner.generations.entry(id.clone()).or_insert(0);
            *slot += 1;
            *slot
        };
        let context = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE).await;
            let still_current = {
                let inner = context.inner.lock();
                inner.generations.get(&id).copied() == Some(generation)
            };
            if !still_current {
                debug!(%id, "finalize superseded by a newer schedule");
                return;
            }
            context.finalize(&id, sink).await;
        });
    }

    async fn finalize(&self, id: &str, sink: Sink) {
        let prepared = {
            let mut inner = self.inner.lock();
            if inner.finalized.contains(id) {
                return;
            }
            let Some(metadata) = inner.metadata.get(id).cloned() else { return };
            let Some(text) = inner.parts_text.get(id).cloned() else { return };
            if text.trim().is_empty() {
                return;
            }
            let role = if metadata.role == Role::Unknown { role::infer(&text) } else { metadata.role };
            inner.finalized.insert(id.to_string());
            inner.metadata.remove(id);
            inner.parts_text.remove(id);
            inner.generations.remove(id);
            Some((metadata, text, role))
        };
        let Some((metadata, text, role)) = prepared else { return };
        sink(FinalizedMessage {
            message_id: id.to_string(),
            session_id: metadata.session_id,
            role,
            text_content: text,
            info: metadata.info,
        })
        .await;
    }
}

#[cfg(test)]
#[path = "finalizer_tests.rs"]
mod tests;
