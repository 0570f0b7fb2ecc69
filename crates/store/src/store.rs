// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clankers_core::{
    Clock, CompactionEvent, Message, Role, Session, SessionError, SystemClock, ToolExecution,
};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::query::{self, ColumnInfo};
use crate::StoreError;

const SCHEMA: &str = include_str!("schema.sql");

/// Owns the embedded SQLite database: schema application, upsert/merge
/// rules, and reads. Operations are synchronous; callers on an async
/// runtime should run them via `tokio::task::spawn_blocking`.
pub struct Store<C: Clock = SystemClock> {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    clock: C,
}

impl Store<SystemClock> {
    /// Opens (creating if necessary) the database at `path`, applying the
    /// schema idempotently. Returns the store and whether the file was
    /// newly created.
    pub fn ensure_db(path: &Path) -> Result<(Self, bool), StoreError> {
        Self::ensure_db_with_clock(path, SystemClock)
    }

    /// Opens `path` read-only, failing if it does not already exist. Used
    /// by the `query` CLI command, which must never create or mutate the
    /// database it inspects.
    pub fn open_read_only(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(path, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn: Mutex::new(conn), db_path: path.to_path_buf(), clock: SystemClock })
    }
}

impl<C: Clock> Store<C> {
    pub fn ensure_db_with_clock(path: &Path, clock: C) -> Result<(Self, bool), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let created = !path.exists();
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok((Self { conn: Mutex::new(conn), db_path: path.to_path_buf(), clock }, created))
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn upsert_session(&self, session: &Session) -> Result<(), StoreError> {
        if session.id.is_empty() {
            return Err(StoreError::InvalidPayload("id"));
        }
        let conn = self.conn.lock();
        let existing = conn
            .query_row(
                "SELECT title, project_path, project_name, model, provider, source, \
                 prompt_tokens, completion_tokens, cost, created_at, updated_at \
                 FROM sessions WHERE id = ?1",
                params![session.id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, i64>(6)?,
                        row.get::<_, i64>(7)?,
                        row.get::<_, f64>(8)?,
                        row.get::<_, i64>(9)?,
                        row.get::<_, Option<i64>>(10)?,
                    ))
                },
            )
            .optional()?;

        match existing {
            None => {
                let created_at = session.created_at.map(|v| v as i64).unwrap_or(self.clock.epoch_ms() as i64);
                conn.execute(
                    "INSERT INTO sessions (id, title, project_path, project_name, model, \
                     provider, source, prompt_tokens, completion_tokens, cost, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    params![
                        session.id,
                        session.title.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| "Untitled Session".to_string()),
                        session.project_path,
                        session.project_name,
                        session.model,
                        session.provider,
                        session.source,
                        session.prompt_tokens.unwrap_or(0),
                        session.completion_tokens.unwrap_or(0),
                        session.cost.unwrap_or(0.0),
                        created_at,
                        session.updated_at.map(|v| v as i64),
                    ],
                )?;
            }
            Some((
                old_title,
                old_project_path,
                old_project_name,
                old_model,
                old_provider,
                old_source,
                old_prompt_tokens,
                old_completion_tokens,
                old_cost,
                old_created_at,
                old_updated_at,
            )) => {
                let title = merge_stable_string(Some(old_title), session.title.clone())
                    .unwrap_or_else(|| "Untitled Session".to_string());
                let project_path = merge_replaceable(old_project_path, session.project_path.clone());
                let project_name = merge_replaceable(old_project_name, session.project_name.clone());
                let model = merge_stable_string(old_model, session.model.clone());
                let provider = merge_stable_string(old_provider, session.provider.clone());
                let source = merge_stable_string(old_source, session.source.clone());
                let prompt_tokens = session.prompt_tokens.unwrap_or(old_prompt_tokens);
                let completion_tokens = session.completion_tokens.unwrap_or(old_completion_tokens);
                let cost = session.cost.unwrap_or(old_cost);
                let updated_at = session.updated_at.map(|v| v as i64).or(old_updated_at);

                conn.execute(
                    "UPDATE sessions SET title = ?2, project_path = ?3, project_name = ?4, \
                     model = ?5, provider = ?6, source = ?7, prompt_tokens = ?8, \
                     completion_tokens = ?9, cost = ?10, updated_at = ?11 WHERE id = ?1",
                    params![
                        session.id,
                        title,
                        project_path,
                        project_name,
                        model,
                        provider,
                        source,
                        prompt_tokens,
                        completion_tokens,
                        cost,
                        updated_at,
                    ],
                )?;
                let _ = old_created_at; // created_at is immutable; never written on UPDATE.
            }
        }
        Ok(())
    }

    pub fn upsert_message(&self, message: &Message) -> Result<(), StoreError> {
        if message.id.is_empty() {
            return Err(StoreError::InvalidPayload("id"));
        }
        if message.session_id.is_empty() {
            return Err(StoreError::InvalidPayload("sessionId"));
        }
        let conn = self.conn.lock();
        ensure_session_exists(&conn, &message.session_id, "messages.sessionId")?;

        let existing = conn
            .query_row(
                "SELECT text_content, model, source, prompt_tokens, completion_tokens, \
                 duration_ms, created_at, completed_at FROM messages WHERE id = ?1",
                params![message.id],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, Option<i64>>(5)?,
                        row.get::<_, i64>(6)?,
                        row.get::<_, Option<i64>>(7)?,
                    ))
                },
            )
            .optional()?;

        match existing {
            None => {
                let created_at = message.created_at.map(|v| v as i64).unwrap_or(self.clock.epoch_ms() as i64);
                conn.execute(
                    "INSERT INTO messages (id, session_id, role, text_content, model, source, \
                     prompt_tokens, completion_tokens, duration_ms, created_at, completed_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    params![
                        message.id,
                        message.session_id,
                        message.role.to_string(),
                        message.text_content,
                        message.model,
                        message.source,
                        message.prompt_tokens.unwrap_or(0),
                        message.completion_tokens.unwrap_or(0),
                        message.duration_ms,
                        created_at,
                        message.completed_at.map(|v| v as i64),
                    ],
                )?;
            }
            Some((
                old_text,
                old_model,
                old_source,
                old_prompt_tokens,
                old_completion_tokens,
                old_duration_ms,
                _old_created_at,
                old_completed_at,
            )) => {
                let text_content = merge_stable_string(old_text, message.text_content.clone());
                let model = merge_stable_string(old_model, message.model.clone());
                let source = merge_stable_string(old_source, message.source.clone());
                let prompt_tokens = message.prompt_tokens.unwrap_or(old_prompt_tokens);
                let completion_tokens = message.completion_tokens.unwrap_or(old_completion_tokens);
                let duration_ms = message.duration_ms.or(old_duration_ms);
                let completed_at = message.completed_at.map(|v| v as i64).or(old_completed_at);

                conn.execute(
                    "UPDATE messages SET role = ?2, text_content = ?3, model = ?4, source = ?5, \
                     prompt_tokens = ?6, completion_tokens = ?7, duration_ms = ?8, \
                     completed_at = ?9 WHERE id = ?1",
                    params![
                        message.id,
                        message.role.to_string(),
                        text_content,
                        model,
                        source,
                        prompt_tokens,
                        completion_tokens,
                        duration_ms,
                        completed_at,
                    ],
                )?;
            }
        }
        Ok(())
    }

    pub fn upsert_tool(&self, tool: &ToolExecution) -> Result<(), StoreError> {
        if tool.id.is_empty() {
            return Err(StoreError::InvalidPayload("id"));
        }
        if tool.session_id.is_empty() {
            return Err(StoreError::InvalidPayload("sessionId"));
        }
        let conn = self.conn.lock();
        ensure_session_exists(&conn, &tool.session_id, "toolExecutions.sessionId")?;

        let existing = conn
            .query_row(
                "SELECT tool_name, tool_input, tool_output, success, error_message, \
                 duration_ms, file_path, created_at FROM tool_executions WHERE id = ?1",
                params![tool.id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<bool>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<i64>>(5)?,
                        row.get::<_, Option<String>>(6)?,
                        row.get::<_, i64>(7)?,
                    ))
                },
            )
            .optional()?;

        match existing {
            None => {
                if tool.tool_name.is_empty() {
                    return Err(StoreError::InvalidPayload("toolName"));
                }
                let created_at = tool.created_at.map(|v| v as i64).unwrap_or(self.clock.epoch_ms() as i64);
                conn.execute(
                    "INSERT INTO tool_executions (id, session_id, tool_name, tool_input, \
                     tool_output, success, error_message, duration_ms, file_path, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        tool.id,
                        tool.session_id,
                        tool.tool_name,
                        tool.tool_input,
                        tool.tool_output,
                        tool.success,
                        tool.error_message,
                        tool.duration_ms,
                        tool.file_path,
                        created_at,
                    ],
                )?;
            }
            Some((
                old_tool_name,
                old_tool_input,
                old_tool_output,
                old_success,
                old_error_message,
                old_duration_ms,
                old_file_path,
                _old_created_at,
            )) => {
                let tool_name = merge_stable_string(Some(old_tool_name), Some(tool.tool_name.clone()))
                    .unwrap_or_default();
                let tool_input = merge_replaceable(old_tool_input, tool.tool_input.clone());
                let tool_output = merge_replaceable(old_tool_output, tool.tool_output.clone());
                let success = tool.success.or(old_success);
                let error_message = merge_replaceable(old_error_message, tool.error_message.clone());
                let duration_ms = tool.duration_ms.or(old_duration_ms);
                let file_path = merge_replaceable(old_file_path, tool.file_path.clone());

                conn.execute(
                    "UPDATE tool_executions SET tool_name = ?2, tool_input = ?3, tool_output = ?4, \
                     success = ?5, error_message = ?6, duration_ms = ?7, file_path = ?8 WHERE id = ?1",
                    params![
                        tool.id, tool_name, tool_input, tool_output, success, error_message,
                        duration_ms, file_path,
                    ],
                )?;
            }
        }
        Ok(())
    }

    pub fn upsert_session_error(&self, error: &SessionError) -> Result<(), StoreError> {
        if error.id.is_empty() {
            return Err(StoreError::InvalidPayload("id"));
        }
        if error.session_id.is_empty() {
            return Err(StoreError::InvalidPayload("sessionId"));
        }
        let conn = self.conn.lock();
        ensure_session_exists(&conn, &error.session_id, "sessionErrors.sessionId")?;

        let existing = conn
            .query_row(
                "SELECT error_type, error_message, created_at FROM session_errors WHERE id = ?1",
                params![error.id],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        match existing {
            None => {
                let created_at = error.created_at.map(|v| v as i64).unwrap_or(self.clock.epoch_ms() as i64);
                conn.execute(
                    "INSERT INTO session_errors (id, session_id, error_type, error_message, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![error.id, error.session_id, error.error_type, error.error_message, created_at],
                )?;
            }
            Some((old_error_type, old_error_message, _old_created_at)) => {
                let error_type = merge_stable_string(old_error_type, error.error_type.clone());
                let error_message = merge_replaceable(old_error_message, error.error_message.clone());
                conn.execute(
                    "UPDATE session_errors SET error_type = ?2, error_message = ?3 WHERE id = ?1",
                    params![error.id, error_type, error_message],
                )?;
            }
        }
        Ok(())
    }

    pub fn upsert_compaction_event(&self, event: &CompactionEvent) -> Result<(), StoreError> {
        if event.id.is_empty() {
            return Err(StoreError::InvalidPayload("id"));
        }
        if event.session_id.is_empty() {
            return Err(StoreError::InvalidPayload("sessionId"));
        }
        let conn = self.conn.lock();
        ensure_session_exists(&conn, &event.session_id, "compactionEvents.sessionId")?;

        let existing = conn
            .query_row(
                "SELECT tokens_before, tokens_after, messages_before, messages_after, created_at \
                 FROM compaction_events WHERE id = ?1",
                params![event.id],
                |row| {
                    Ok((
                        row.get::<_, Option<i64>>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;

        match existing {
            None => {
                let created_at = event.created_at.map(|v| v as i64).unwrap_or(self.clock.epoch_ms() as i64);
                conn.execute(
                    "INSERT INTO compaction_events (id, session_id, tokens_before, tokens_after, \
                     messages_before, messages_after, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        event.id, event.session_id, event.tokens_before, event.tokens_after,
                        event.messages_before, event.messages_after, created_at,
                    ],
                )?;
            }
            Some((old_tb, old_ta, old_mb, old_ma, _old_created_at)) => {
                let tokens_before = event.tokens_before.or(old_tb);
                let tokens_after = event.tokens_after.or(old_ta);
                let messages_before = event.messages_before.or(old_mb);
                let messages_after = event.messages_after.or(old_ma);
                conn.execute(
                    "UPDATE compaction_events SET tokens_before = ?2, tokens_after = ?3, \
                     messages_before = ?4, messages_after = ?5 WHERE id = ?1",
                    params![event.id, tokens_before, tokens_after, messages_before, messages_after],
                )?;
            }
        }
        Ok(())
    }

    /// `limit == 0` means no limit. Ordered by `created_at` descending, ties
    /// broken by `id` ascending.
    pub fn get_sessions(&self, limit: u32) -> Result<Vec<Session>, StoreError> {
        let conn = self.conn.lock();
        let sql = if limit == 0 {
            "SELECT id, title, project_path, project_name, model, provider, source, \
             prompt_tokens, completion_tokens, cost, created_at, updated_at FROM sessions \
             ORDER BY created_at DESC, id ASC".to_string()
        } else {
            format!(
                "SELECT id, title, project_path, project_name, model, provider, source, \
                 prompt_tokens, completion_tokens, cost, created_at, updated_at FROM sessions \
                 ORDER BY created_at DESC, id ASC LIMIT {limit}"
            )
        };
        let mut statement = conn.prepare(&sql)?;
        let sessions = statement
            .query_map([], row_to_session)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    pub fn get_session_by_id(&self, id: &str) -> Result<(Session, Vec<Message>), StoreError> {
        let conn = self.conn.lock();
        let session = conn
            .query_row(
                "SELECT id, title, project_path, project_name, model, provider, source, \
                 prompt_tokens, completion_tokens, cost, created_at, updated_at FROM sessions \
                 WHERE id = ?1",
                params![id],
                row_to_session,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let messages = query_messages(&conn, id)?;
        Ok((session, messages))
    }

    pub fn get_messages(&self, session_id: &str) -> Result<Vec<Message>, StoreError> {
        let conn = self.conn.lock();
        query_messages(&conn, session_id)
    }

    pub fn execute_query(&self, sql: &str) -> Result<Vec<BTreeMap<String, Value>>, StoreError> {
        let conn = self.conn.lock();
        query::execute_query(&conn, sql)
    }

    pub fn table_schema(&self, table: &str) -> Result<Vec<ColumnInfo>, StoreError> {
        let conn = self.conn.lock();
        query::table_schema(&conn, table)
    }

    pub fn suggest_column_names(&self, table: &str, typo: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock();
        query::suggest_column_names(&conn, table, typo)
    }
}

fn ensure_session_exists(conn: &Connection, session_id: &str, field: &'static str) -> Result<(), StoreError> {
    let exists: bool = conn
        .query_row("SELECT 1 FROM sessions WHERE id = ?1", params![session_id], |_| Ok(true))
        .optional()?
        .unwrap_or(false);
    if exists {
        Ok(())
    } else {
        Err(StoreError::OrphanReference(field))
    }
}

fn query_messages(conn: &Connection, session_id: &str) -> Result<Vec<Message>, StoreError> {
    let mut statement = conn.prepare(
        "SELECT id, session_id, role, text_content, model, source, prompt_tokens, \
         completion_tokens, duration_ms, created_at, completed_at FROM messages \
         WHERE session_id = ?1 ORDER BY created_at ASC",
    )?;
    let messages = statement
        .query_map(params![session_id], row_to_message)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(messages)
}

fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        title: row.get(1)?,
        project_path: row.get(2)?,
        project_name: row.get(3)?,
        model: row.get(4)?,
        provider: row.get(5)?,
        source: row.get(6)?,
        prompt_tokens: row.get(7)?,
        completion_tokens: row.get(8)?,
        cost: row.get(9)?,
        created_at: row.get::<_, i64>(10).map(|v| Some(v as u64))?,
        updated_at: row.get::<_, Option<i64>>(11)?.map(|v| v as u64),
    })
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let role: String = row.get(2)?;
    Ok(Message {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: parse_role(&role),
        text_content: row.get(3)?,
        model: row.get(4)?,
        source: row.get(5)?,
        prompt_tokens: row.get(6)?,
        completion_tokens: row.get(7)?,
        duration_ms: row.get(8)?,
        created_at: row.get::<_, i64>(9).map(|v| Some(v as u64))?,
        completed_at: row.get::<_, Option<i64>>(10)?.map(|v| v as u64),
    })
}

fn parse_role(s: &str) -> Role {
    match s {
        "user" => Role::User,
        "assistant" => Role::Assistant,
        "system" => Role::System,
        _ => Role::Unknown,
    }
}

fn merge_stable_string(old: Option<String>, incoming: Option<String>) -> Option<String> {
    match incoming {
        Some(s) if !s.is_empty() => Some(s),
        _ => old,
    }
}

fn merge_replaceable<T>(old: Option<T>, incoming: Option<T>) -> Option<T> {
    incoming.or(old)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
