// SPDX-License-Identifier: MIT

//! Read-only ad hoc query path (`clankers query "<SQL>"`).

use std::collections::BTreeMap;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::Value;

use crate::levenshtein;
use crate::StoreError;

const FORBIDDEN_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "CREATE", "ALTER", "TRUNCATE", "REPLACE", "MERGE",
    "UPSERT", "ATTACH", "DETACH", "REINDEX", "VACUUM", "PRAGMA", "BEGIN", "COMMIT", "ROLLBACK",
    "SAVEPOINT", "RELEASE",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub sql_type: String,
    pub nullable: bool,
}

/// Rejects anything that isn't a bare `SELECT`/`WITH` statement, and any
/// statement containing a forbidden keyword anywhere in its text.
pub fn guard_read_only(sql: &str) -> Result<(), StoreError> {
    let trimmed = sql.trim();
    let starts_ok = {
        let upper = trimmed.to_ascii_uppercase();
        upper.starts_with("SELECT") || upper.starts_with("WITH")
    };
    if !starts_ok {
        return Err(StoreError::Forbidden(
            "statement must begin with SELECT or WITH".to_string(),
        ));
    }

    let upper = trimmed.to_ascii_uppercase();
    for keyword in FORBIDDEN_KEYWORDS {
        if contains_keyword(&upper, keyword) {
            return Err(StoreError::Forbidden(format!("forbidden keyword: {keyword}")));
        }
    }
    Ok(())
}

fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    haystack
        .match_indices(keyword)
        .any(|(start, _)| {
            let end = start + keyword.len();
            let before_ok = start == 0 || !haystack.as_bytes()[start - 1].is_ascii_alphanumeric();
            let after_ok =
                end == haystack.len() || !haystack.as_bytes()[end].is_ascii_alphanumeric();
            before_ok && after_ok
        })
}

pub fn execute_query(
    conn: &Connection,
    sql: &str,
) -> Result<Vec<BTreeMap<String, Value>>, StoreError> {
    guard_read_only(sql)?;

    let mut statement = conn
        .prepare(sql)
        .map_err(|e| StoreError::BadSql(e.to_string()))?;
    let column_names: Vec<String> =
        statement.column_names().iter().map(|s| s.to_string()).collect();

    let rows = statement
        .query_map([], |row| {
            let mut map = BTreeMap::new();
            for (idx, name) in column_names.iter().enumerate() {
                let value = match row.get_ref(idx)? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(i) => Value::from(i),
                    ValueRef::Real(f) => serde_json::Number::from_f64(f)
                        .map(Value::Number)
                        .unwrap_or(Value::Null),
                    ValueRef::Text(t) => Value::from(String::from_utf8_lossy(t).into_owned()),
                    ValueRef::Blob(b) => Value::from(b.to_vec()),
                };
                map.insert(name.clone(), value);
            }
            Ok(map)
        })
        .map_err(|e| StoreError::BadSql(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

pub fn table_schema(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>, StoreError> {
    let mut statement = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = statement
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get::<_, String>(1)?,
                sql_type: row.get::<_, String>(2)?,
                nullable: row.get::<_, i64>(3)? == 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Closest 3 real column names of `table` to `typo`, by edit distance.
pub fn suggest_column_names(
    conn: &Connection,
    table: &str,
    typo: &str,
) -> Result<Vec<String>, StoreError> {
    let columns = table_schema(conn, table)?;
    let mut ranked: Vec<(usize, String)> = columns
        .into_iter()
        .map(|c| (levenshtein::distance(&c.name, typo), c.name))
        .collect();
    ranked.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    Ok(ranked.into_iter().take(3).map(|(_, name)| name).collect())
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
