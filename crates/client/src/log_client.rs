// SPDX-License-Identifier: MIT

//! Fire-and-forget client-side logging: wraps `RpcClient::notify` so the
//! caller's hot path never blocks on or fails because of the daemon.

use clankers_core::{LogEntry, LogLevel};

use crate::rpc::RpcClient;

#[derive(Clone)]
pub struct LogClient {
    rpc: RpcClient,
}

impl LogClient {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    pub async fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.write(LogEntry {
            timestamp: None,
            level,
            component: None,
            message: message.into(),
            request_id: None,
            context: None,
        })
        .await;
    }

    /// Writes a pre-built entry, e.g. one an adapter wants to attach
    /// `context` or a `requestId` to.
    pub async fn write(&self, entry: LogEntry) {
        self.rpc.notify_entity("log.write", "entry", &entry).await;
    }
}

#[cfg(test)]
#[path = "log_client_tests.rs"]
mod tests;
