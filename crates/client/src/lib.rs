// SPDX-License-Identifier: MIT

//! Client-side library shared by harness adapters and the CLI: a one-shot
//! JSON-RPC client, client-side logging, and the streamed-message finalizer.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod error;
mod finalizer;
mod log_client;
mod role;
mod rpc;

pub use error::{FinalizeError, RpcError};
pub use finalizer::{FinalizedMessage, FinalizerContext, MetadataUpdate, Part, Sink};
pub use log_client::LogClient;
pub use rpc::RpcClient;
