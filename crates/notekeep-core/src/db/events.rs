use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::analytics::{AnalyticsEvent, EventType, Location};
use crate::error::{NotekeepError, Result};
use crate::store::EventQuery;
use crate::time::{format_timestamp, parse_timestamp};

const EVENT_COLUMNS: &str = "id, event_type, event_data, user_id, session_id, user_agent, \
                             ip_address, location, created_at";

struct EventRow {
    id: String,
    event_type: String,
    event_data: String,
    user_id: String,
    session_id: String,
    user_agent: String,
    ip_address: String,
    location: String,
    created_at: String,
}

fn extract_event_row(row: &rusqlite::Row) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        event_type: row.get(1)?,
        event_data: row.get(2)?,
        user_id: row.get(3)?,
        session_id: row.get(4)?,
        user_agent: row.get(5)?,
        ip_address: row.get(6)?,
        location: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn json_column<T: DeserializeOwned>(id: &str, column: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| {
        NotekeepError::Storage(format!("event {} has malformed {}: {}", id, column, e))
    })
}

impl EventRow {
    fn into_event(self) -> Result<AnalyticsEvent> {
        let event_type: EventType = self.event_type.parse().map_err(|_| {
            NotekeepError::Storage(format!(
                "event {} has unknown type '{}'",
                self.id, self.event_type
            ))
        })?;
        let created_at = parse_timestamp(&self.created_at).ok_or_else(|| {
            NotekeepError::Storage(format!(
                "event {} has malformed created_at '{}'",
                self.id, self.created_at
            ))
        })?;
        let event_data: Map<String, Value> = json_column(&self.id, "event_data", &self.event_data)?;
        let location: Location = json_column(&self.id, "location", &self.location)?;

        Ok(AnalyticsEvent {
            event_data,
            id: self.id,
            event_type,
            user_id: self.user_id,
            session_id: self.session_id,
            user_agent: self.user_agent,
            ip_address: self.ip_address,
            location,
            created_at,
        })
    }
}

pub(super) fn insert_event(conn: &Connection, event: &AnalyticsEvent) -> Result<()> {
    conn.execute(
        "INSERT INTO analytics_events (id, event_type, event_data, user_id, session_id, \
         user_agent, ip_address, location, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            event.id,
            event.event_type.as_str(),
            serde_json::to_string(&event.event_data)?,
            event.user_id,
            event.session_id,
            event.user_agent,
            event.ip_address,
            serde_json::to_string(&event.location)?,
            format_timestamp(&event.created_at),
        ],
    )
    .map_err(|e| crate::map_db_err!("insert analytics event", e))?;
    Ok(())
}

pub(super) fn query_events(conn: &Connection, query: &EventQuery) -> Result<Vec<AnalyticsEvent>> {
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

    let mut sql = format!("SELECT {} FROM analytics_events", EVENT_COLUMNS);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC, id ASC");

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| crate::map_db_err!("prepare event query", e))?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), extract_event_row)
        .map_err(|e| crate::map_db_err!("query analytics events", e))?;

    rows.map(|row| row.map_err(NotekeepError::from)?.into_event())
        .collect()
}
