// SPDX-License-Identifier: MIT

//! The embedded SQL store: schema, upsert/field-preservation rules, and the
//! read-only query path used by the CLI.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod error;
mod levenshtein;
mod query;
mod store;

pub use error::StoreError;
pub use query::ColumnInfo;
pub use store::Store;
