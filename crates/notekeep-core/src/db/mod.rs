//! SQLite database module for notekeep

mod events;
mod notes;
mod schema;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::analytics::AnalyticsEvent;
use crate::error::{NotekeepError, Result};
use crate::notes::{NoteRecord, NoteUpdate};
use crate::store::{EventQuery, NoteQuery, Store};

pub use schema::{create_schema, SchemaCreateResult, CURRENT_SCHEMA_VERSION};

/// SQLite-backed [`Store`](crate::store::Store)
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create the database file at `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path).map_err(|e| {
            NotekeepError::Other(format!(
                "failed to open database at {}: {}",
                db_path.display(),
                e
            ))
        })?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| NotekeepError::Other(format!("failed to enable WAL mode: {}", e)))?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        tracing::debug!(path = %db_path.display(), "database opened");
        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let result = create_schema(&conn)
            .map_err(|e| NotekeepError::Other(format!("failed to create database schema: {}", e)))?;
        if result == SchemaCreateResult::Recreated {
            tracing::warn!("database schema was recreated; previous records were discarded");
        }

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| NotekeepError::Storage("database connection lock poisoned".to_string()))
    }

    pub fn get_event_count(&self) -> Result<i64> {
        self.conn()?
            .query_row("SELECT COUNT(*) FROM analytics_events", [], |r| r.get(0))
            .map_err(|e| crate::map_db_err!("count events", e))
    }

    pub fn get_note_count(&self) -> Result<i64> {
        self.conn()?
            .query_row("SELECT COUNT(*) FROM notes", [], |r| r.get(0))
            .map_err(|e| crate::map_db_err!("count notes", e))
    }

    pub fn get_schema_version(&self) -> Result<i32> {
        self.conn()?
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |r| {
                    let s: String = r.get(0)?;
                    Ok(s.parse().unwrap_or(0))
                },
            )
            .map_err(|e| crate::map_db_err!("read schema version", e))
    }
}

impl Store for Database {
    fn insert_event(&self, event: &AnalyticsEvent) -> Result<()> {
        events::insert_event(&*self.conn()?, event)
    }

    fn query_events(&self, query: &EventQuery) -> Result<Vec<AnalyticsEvent>> {
        events::query_events(&*self.conn()?, query)
    }

    fn insert_note(&self, note: &NoteRecord) -> Result<()> {
        notes::insert_note(&*self.conn()?, note)
    }

    fn get_note(&self, id: &str) -> Result<Option<NoteRecord>> {
        notes::get_note(&*self.conn()?, id)
    }

    fn query_notes(&self, query: &NoteQuery) -> Result<Vec<NoteRecord>> {
        notes::query_notes(&*self.conn()?, query)
    }

    fn update_note(
        &self,
        id: &str,
        update: &NoteUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<NoteRecord>> {
        notes::update_note(&mut *self.conn()?, id, update, updated_at)
    }

    fn delete_note(&self, id: &str) -> Result<bool> {
        notes::delete_note(&*self.conn()?, id)
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        // flush WAL so a following open sees every committed row
        if let Ok(conn) = self.conn.get_mut() {
            let _ = conn.pragma_update(None, "wal_checkpoint", "TRUNCATE");
        }
    }
}

/// Escape `%`, `_` and `\` for use in a `LIKE ... ESCAPE '\'` pattern
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests;
