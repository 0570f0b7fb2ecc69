// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("payload is missing a required field: {0}")]
    InvalidPayload(&'static str),
    #[error("{0} references a session that does not exist")]
    OrphanReference(&'static str),
    #[error("no row found for id {0:?}")]
    NotFound(String),
    #[error("query rejected: {0}")]
    Forbidden(String),
    #[error("malformed SQL: {0}")]
    BadSql(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
