// SPDX-License-Identifier: MIT

use tempfile::tempdir;

use super::*;

#[test]
fn query_against_a_missing_database_is_an_error() {
    let dir = tempdir().unwrap();
    let args = QueryArgs {
        sql: "select 1".to_string(),
        db_path: Some(dir.path().join("missing.db")),
        format: OutputFormat::Table,
    };
    assert!(query(args).is_err());
}

#[test]
fn query_runs_a_select_against_an_existing_database() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("clankers.db");
    let (_store, _) = Store::ensure_db(&db_path).unwrap();

    let args = QueryArgs {
        sql: "select 1 as one".to_string(),
        db_path: Some(db_path),
        format: OutputFormat::Json,
    };
    query(args).unwrap();
}
