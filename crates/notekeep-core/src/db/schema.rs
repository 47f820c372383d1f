//! SQLite database schema for notekeep

use rusqlite::{Connection, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Result of schema creation
#[derive(Debug, PartialEq, Eq)]
pub enum SchemaCreateResult {
    /// Schema already current or freshly created on an empty database
    Ok,
    /// An incompatible schema was dropped and created again
    Recreated,
}

const SCHEMA_SQL: &str = r#"
-- Append-only usage events
CREATE TABLE IF NOT EXISTS analytics_events (
    id TEXT PRIMARY KEY,
    event_type TEXT NOT NULL,
    event_data TEXT NOT NULL DEFAULT '{}',
    user_id TEXT NOT NULL,
    session_id TEXT NOT NULL,
    user_agent TEXT NOT NULL,
    ip_address TEXT NOT NULL,
    location TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_created ON analytics_events(created_at);
CREATE INDEX IF NOT EXISTS idx_events_user ON analytics_events(user_id, created_at);

-- User notes
CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL DEFAULT '',
    tags TEXT,
    language TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_notes_created ON notes(created_at);
CREATE INDEX IF NOT EXISTS idx_notes_user ON notes(user_id, created_at);

CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT
);
"#;

fn drop_all_tables(conn: &Connection) -> Result<()> {
    conn.execute("DROP TABLE IF EXISTS analytics_events", [])?;
    conn.execute("DROP TABLE IF EXISTS notes", [])?;
    conn.execute("DROP TABLE IF EXISTS meta", [])?;
    Ok(())
}

fn write_version(conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        [&CURRENT_SCHEMA_VERSION.to_string()],
    )?;
    Ok(())
}

pub fn create_schema(conn: &Connection) -> Result<SchemaCreateResult> {
    let current_version: Option<i32> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |r| r.get::<_, String>(0).map(|s| s.parse().unwrap_or(0)),
        )
        .ok();

    let result = match current_version {
        None => {
            conn.execute_batch(SCHEMA_SQL)?;
            write_version(conn)?;
            SchemaCreateResult::Ok
        }
        Some(v) if v == CURRENT_SCHEMA_VERSION => SchemaCreateResult::Ok,
        Some(v) => {
            drop_all_tables(conn)?;
            conn.execute_batch(SCHEMA_SQL)?;
            write_version(conn)?;
            tracing::info!(
                "Database schema updated from version {} to {}",
                v,
                CURRENT_SCHEMA_VERSION
            );
            SchemaCreateResult::Recreated
        }
    };

    Ok(result)
}

#[cfg(test)]
pub fn force_set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        [&version.to_string()],
    )?;
    Ok(())
}
