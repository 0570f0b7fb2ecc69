// SPDX-License-Identifier: MIT

//! One-shot RPC client (§4.7): each call opens a fresh connection, sends
//! one framed request, reads the single framed response, and closes.
//! Grounded in the teacher's `cli/src/client_queries.rs` per-call
//! connect-send-read-close shape, adapted to this protocol's framing.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use clankers_wire::{
    read_message, write_message, ClientInfo, Envelope, JsonRpcRequest, JsonRpcResponse, RequestId,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::RpcError;

/// A typed RPC handle bound to one transport path and client identity.
/// Cheap to clone; every call opens its own connection.
#[derive(Clone)]
pub struct RpcClient {
    transport_path: PathBuf,
    client: ClientInfo,
    next_id: std::sync::Arc<AtomicI64>,
}

impl RpcClient {
    pub fn new(transport_path: PathBuf, client_name: impl Into<String>, client_version: impl Into<String>) -> Self {
        Self {
            transport_path,
            client: ClientInfo { name: client_name.into(), version: client_version.into() },
            next_id: std::sync::Arc::new(AtomicI64::new(1)),
        }
    }

    pub(crate) fn envelope<P: Serialize>(&self, entity_key: &str, entity: P) -> Value {
        let mut value = serde_json::json!({
            "schemaVersion": 1,
            "client": { "name": self.client.name, "version": self.client.version },
        });
        value[entity_key] = serde_json::to_value(entity).unwrap_or(Value::Null);
        value
    }

    /// Sends `method` with a pre-built params object (the caller assembles
    /// the envelope fields itself), awaiting the response.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = RequestId::Number(self.next_id.fetch_add(1, Ordering::Relaxed));
        let request = JsonRpcRequest::new(id, method, params);
        let response = self.roundtrip(&request).await?;
        match response.error {
            Some(error) => Err(RpcError::Remote(error)),
            None => Ok(response.result.unwrap_or(Value::Null)),
        }
    }

    /// Convenience wrapper building the standard envelope around one named
    /// entity field, e.g. `call_entity("upsertSession", "session", &session)`.
    pub async fn call_entity<P: Serialize>(
        &self,
        method: &str,
        entity_key: &str,
        entity: &P,
    ) -> Result<Value, RpcError> {
        self.call(method, self.envelope(entity_key, entity)).await
    }

    /// Fire-and-forget: writes the request and drops the connection without
    /// awaiting or parsing a response. Any I/O failure is swallowed — used
    /// only for `log.write`, which must never back-pressure the caller or
    /// propagate a daemon-absent error.
    pub async fn notify(&self, method: &str, params: Value) {
        let request = JsonRpcRequest::notification(method, params);
        let _ = self.send_only(&request).await;
    }

    /// Fire-and-forget variant of [`Self::call_entity`], used by the
    /// client-side logger for `log.write`.
    pub async fn notify_entity<P: Serialize>(&self, method: &str, entity_key: &str, entity: &P) {
        self.notify(method, self.envelope(entity_key, entity)).await;
    }

    async fn roundtrip(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, RpcError> {
        let mut stream = self.connect().await?;
        let body = serde_json::to_vec(request).map_err(RpcError::Decode)?;
        write_message(&mut stream, &body).await?;
        let body = read_message(&mut stream).await?.ok_or(RpcError::NoResponse)?;
        serde_json::from_slice(&body).map_err(RpcError::Decode)
    }

    async fn send_only(&self, request: &JsonRpcRequest) -> Result<(), RpcError> {
        let mut stream = self.connect().await?;
        let body = serde_json::to_vec(request).map_err(RpcError::Decode)?;
        write_message(&mut stream, &body).await?;
        Ok(())
    }

    #[cfg(unix)]
    async fn connect(&self) -> Result<tokio::net::UnixStream, RpcError> {
        tokio::net::UnixStream::connect(&self.transport_path)
            .await
            .map_err(|e| RpcError::Unreachable(self.transport_path.clone(), e))
    }

    #[cfg(windows)]
    async fn connect(&self) -> Result<tokio::net::windows::named_pipe::NamedPipeClient, RpcError> {
        let pipe_name = self.transport_path.to_string_lossy().into_owned();
        tokio::net::windows::named_pipe::ClientOptions::new()
            .open(&pipe_name)
            .map_err(|e| RpcError::Unreachable(self.transport_path.clone(), e))
    }

    pub fn transport_path(&self) -> &Path {
        &self.transport_path
    }
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
