use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::like_pattern;
use crate::error::{NotekeepError, Result};
use crate::notes::{NoteRecord, NoteUpdate};
use crate::store::NoteQuery;
use crate::time::{format_timestamp, parse_timestamp};

const NOTE_COLUMNS: &str = "id, user_id, title, content, tags, language, created_at, updated_at";

struct NoteRow {
    id: String,
    user_id: String,
    title: String,
    content: String,
    tags: Option<String>,
    language: Option<String>,
    created_at: String,
    updated_at: String,
}

fn extract_note_row(row: &rusqlite::Row) -> rusqlite::Result<NoteRow> {
    Ok(NoteRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        tags: row.get(4)?,
        language: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn timestamp(id: &str, column: &str, value: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(value).ok_or_else(|| {
        NotekeepError::Storage(format!("note {} has malformed {} '{}'", id, column, value))
    })
}

impl NoteRow {
    fn into_note(self) -> Result<NoteRecord> {
        let created_at = timestamp(&self.id, "created_at", &self.created_at)?;
        let updated_at = timestamp(&self.id, "updated_at", &self.updated_at)?;
        Ok(NoteRecord {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            content: self.content,
            tags: self.tags,
            language: self.language,
            created_at,
            updated_at,
        })
    }
}

pub(super) fn insert_note(conn: &Connection, note: &NoteRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO notes (id, user_id, title, content, tags, language, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            note.id,
            note.user_id,
            note.title,
            note.content,
            note.tags,
            note.language,
            format_timestamp(&note.created_at),
            format_timestamp(&note.updated_at),
        ],
    )
    .map_err(|e| crate::map_db_err!("insert note", e))?;
    Ok(())
}

pub(super) fn get_note(conn: &Connection, id: &str) -> Result<Option<NoteRecord>> {
    let sql = format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS);
    conn.query_row(&sql, params![id], extract_note_row)
        .optional()
        .map_err(|e| crate::map_db_err!("read note", e))?
        .map(NoteRow::into_note)
        .transpose()
}

pub(super) fn query_notes(conn: &Connection, query: &NoteQuery) -> Result<Vec<NoteRecord>> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<SqlValue> = Vec::new();

    if let Some(user_id) = &query.user_id {
        clauses.push("user_id = ?");
        values.push(SqlValue::Text(user_id.clone()));
    }
    if let Some(since) = &query.since {
        clauses.push("created_at >= ?");
        values.push(SqlValue::Text(format_timestamp(since)));
    }
    if query.tagged_only {
        clauses.push("tags IS NOT NULL AND tags != ''");
    }
    if let Some(search) = &query.search {
        let pattern = like_pattern(search);
        clauses.push("(LOWER(title) LIKE ? ESCAPE '\\' OR LOWER(content) LIKE ? ESCAPE '\\')");
        values.push(SqlValue::Text(pattern.clone()));
        values.push(SqlValue::Text(pattern));
    }

    let mut sql = format!("SELECT {} FROM notes", NOTE_COLUMNS);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC, id ASC");
    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        values.push(SqlValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
    }

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| crate::map_db_err!("prepare note query", e))?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), extract_note_row)
        .map_err(|e| crate::map_db_err!("query notes", e))?;

    rows.map(|row| row.map_err(NotekeepError::from)?.into_note())
        .collect()
}

pub(super) fn update_note(
    conn: &mut Connection,
    id: &str,
    update: &NoteUpdate,
    updated_at: DateTime<Utc>,
) -> Result<Option<NoteRecord>> {
    let tx = conn
        .transaction()
        .map_err(|e| crate::map_db_err!("begin note update", e))?;

    let Some(mut note) = get_note(&tx, id)? else {
        return Ok(None);
    };
    update.apply_to(&mut note, updated_at);

    tx.execute(
        "UPDATE notes SET title = ?1, content = ?2, tags = ?3, language = ?4, updated_at = ?5 \
         WHERE id = ?6",
        params![
            note.title,
            note.content,
            note.tags,
            note.language,
            format_timestamp(&note.updated_at),
            note.id,
        ],
    )
    .map_err(|e| crate::map_db_err!("update note", e))?;
    tx.commit()
        .map_err(|e| crate::map_db_err!("commit note update", e))?;

    Ok(Some(note))
}

pub(super) fn delete_note(conn: &Connection, id: &str) -> Result<bool> {
    let removed = conn
        .execute("DELETE FROM notes WHERE id = ?1", params![id])
        .map_err(|e| crate::map_db_err!("delete note", e))?;
    Ok(removed > 0)
}
