// SPDX-License-Identifier: MIT

use clankers_wire::JsonRpcError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("could not reach the daemon at {0}: {1}")]
    Unreachable(std::path::PathBuf, std::io::Error),
    #[error("transport error: {0}")]
    Protocol(#[from] clankers_wire::ProtocolError),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("the daemon closed the connection without a response")]
    NoResponse,
    #[error("daemon returned error {}: {}", .0.code, .0.message)]
    Remote(JsonRpcError),
}

#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error("stageMetadata requires a non-empty id")]
    MissingId,
    #[error("stageMetadata requires a non-empty sessionId")]
    MissingSessionId,
}
