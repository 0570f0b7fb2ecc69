// SPDX-License-Identifier: MIT

//! The Clankers daemon: a local JSON-RPC server that persists AI coding
//! assistant telemetry into a per-user SQLite database.

mod dispatcher;
mod error;
mod lifecycle;
mod listener;
mod logger;

pub use dispatcher::Dispatcher;
pub use error::LifecycleError;
pub use lifecycle::{Config, ConfigOverrides, Daemon};
pub use logger::Logger;
