// SPDX-License-Identifier: MIT

//! JSON-RPC method table (§4.4): decodes params, calls the store and
//! logger, and maps failures onto JSON-RPC error codes.

use std::path::PathBuf;
use std::sync::Arc;

use clankers_core::{
    Clock, CompactionEvent, LogEntry, Message, Session, SessionError, SystemClock, ToolExecution,
};
use clankers_store::{Store, StoreError};
use clankers_wire::{Envelope, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use serde::Deserialize;
use serde_json::Value;

use crate::logger::Logger;

/// Owns the store and logger handles the method table calls into. Generic
/// over the clock so tests can run it against a `Store<FakeClock>`.
pub struct Dispatcher<C: Clock = SystemClock> {
    store: Arc<Store<C>>,
    logger: Arc<Logger>,
    db_path: PathBuf,
    created_on_startup: bool,
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(
        store: Arc<Store<C>>,
        logger: Arc<Logger>,
        db_path: PathBuf,
        created_on_startup: bool,
    ) -> Self {
        Self { store, logger, db_path, created_on_startup }
    }

    /// Dispatches one decoded request. Returns `None` for notifications
    /// (no `id`) so the listener writes nothing back.
    pub fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        match self.handle(&request) {
            Ok(result) => id.map(|id| JsonRpcResponse::success(id, result)),
            Err(error) => Some(JsonRpcResponse::failure(id, error)),
        }
    }

    fn handle(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        match request.method.as_str() {
            "health" => self.health(request),
            "ensureDb" => self.ensure_db(request),
            "getDbPath" => self.get_db_path(request),
            "upsertSession" => self.upsert_session(request),
            "upsertMessage" => self.upsert_message(request),
            "upsertTool" => self.upsert_tool(request),
            "upsertSessionError" => self.upsert_session_error(request),
            "upsertCompactionEvent" => self.upsert_compaction_event(request),
            "log.write" => self.log_write(request),
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    fn health(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        let _: Envelope = parse_params(request.params.as_ref())?;
        Ok(serde_json::json!({ "ok": true, "version": env!("CARGO_PKG_VERSION") }))
    }

    fn ensure_db(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        let _: Envelope = parse_params(request.params.as_ref())?;
        Ok(serde_json::json!({ "dbPath": self.db_path, "created": self.created_on_startup }))
    }

    fn get_db_path(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        let _: Envelope = parse_params(request.params.as_ref())?;
        Ok(serde_json::json!({ "dbPath": self.db_path }))
    }

    fn upsert_session(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        let params: SessionParams = parse_params(request.params.as_ref())?;
        self.store.upsert_session(&params.session).map_err(store_error)?;
        Ok(ok_result())
    }

    fn upsert_message(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        let params: MessageParams = parse_params(request.params.as_ref())?;
        self.store.upsert_message(&params.message).map_err(store_error)?;
        Ok(ok_result())
    }

    fn upsert_tool(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        let params: ToolParams = parse_params(request.params.as_ref())?;
        self.store.upsert_tool(&params.tool).map_err(store_error)?;
        Ok(ok_result())
    }

    fn upsert_session_error(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        let params: SessionErrorParams = parse_params(request.params.as_ref())?;
        self.store.upsert_session_error(&params.session_error).map_err(store_error)?;
        Ok(ok_result())
    }

    fn upsert_compaction_event(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        let params: CompactionEventParams = parse_params(request.params.as_ref())?;
        self.store.upsert_compaction_event(&params.compaction_event).map_err(store_error)?;
        Ok(ok_result())
    }

    /// The envelope's `client.name` becomes the default `component` when the
    /// caller sent an empty one (invariant 10).
    fn log_write(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        let params: LogWriteParams = parse_params(request.params.as_ref())?;
        let mut entry = params.entry;
        if entry.component.as_deref().unwrap_or("").is_empty() {
            entry.component = Some(params.envelope.client.name.clone());
        }
        self.logger.write_entry(&entry).map_err(|e| JsonRpcError::internal(e.to_string()))?;
        Ok(ok_result())
    }
}

fn ok_result() -> Value {
    serde_json::json!({ "ok": true })
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<&Value>) -> Result<T, JsonRpcError> {
    let value = params.ok_or_else(|| JsonRpcError::invalid_params("missing params"))?;
    serde_json::from_value(value.clone()).map_err(|e| JsonRpcError::invalid_params(e.to_string()))
}

fn store_error(err: StoreError) -> JsonRpcError {
    match err {
        StoreError::InvalidPayload(field) => JsonRpcError::missing_field(field),
        other => JsonRpcError::internal(other.to_string()),
    }
}

#[derive(Deserialize)]
struct SessionParams {
    #[serde(flatten)]
    _envelope: Envelope,
    session: Session,
}

#[derive(Deserialize)]
struct MessageParams {
    #[serde(flatten)]
    _envelope: Envelope,
    message: Message,
}

#[derive(Deserialize)]
struct ToolParams {
    #[serde(flatten)]
    _envelope: Envelope,
    tool: ToolExecution,
}

#[derive(Deserialize)]
struct SessionErrorParams {
    #[serde(flatten)]
    _envelope: Envelope,
    #[serde(rename = "sessionError")]
    session_error: SessionError,
}

#[derive(Deserialize)]
struct CompactionEventParams {
    #[serde(flatten)]
    _envelope: Envelope,
    #[serde(rename = "compactionEvent")]
    compaction_event: CompactionEvent,
}

#[derive(Deserialize)]
struct LogWriteParams {
    #[serde(flatten)]
    envelope: Envelope,
    entry: LogEntry,
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
