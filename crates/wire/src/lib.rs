// SPDX-License-Identifier: MIT

//! IPC protocol for daemon communication.
//!
//! Wire format: `Content-Length: <n>\r\n\r\n<body>` framing (LSP-style),
//! carrying JSON-RPC 2.0 request/response/error bodies.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod envelope;
mod framing;
mod jsonrpc;

pub use envelope::{ClientInfo, Envelope};
pub use framing::{read_message, write_message, ProtocolError};
pub use jsonrpc::{error_codes, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
