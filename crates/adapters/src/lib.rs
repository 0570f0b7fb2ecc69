// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

mod claude_code;
mod codex;
mod error;
mod opencode;
mod tailer;
mod watch;

pub use claude_code::ClaudeCodeAdapter;
pub use codex::CodexAdapter;
pub use error::AdapterError;
pub use opencode::OpencodeAdapter;
pub use tailer::LineTailer;
pub use watch::{run, LineHandler};
