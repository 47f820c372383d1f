//! Storage collaborator
//!
//! Everything the core reads or writes goes through [`Store`]. The SQLite
//! [`Database`](crate::db::Database) is the durable implementation;
//! [`MemoryStore`] keeps records in process and can simulate faults.

mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};

use crate::analytics::{AnalyticsEvent, ANONYMOUS_USER};
use crate::error::Result;
use crate::notes::{NoteRecord, NoteUpdate};

/// Filter for reading analytics events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Owner equality filter; `None` reads every owner
    pub user_id: Option<String>,
    /// Inclusive lower bound on `created_at`
    pub since: Option<DateTime<Utc>>,
}

/// Filter for reading notes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteQuery {
    /// Owner equality filter; `None` reads every owner
    pub user_id: Option<String>,
    /// Case-insensitive substring matched against title and content
    pub search: Option<String>,
    /// Inclusive lower bound on `created_at`
    pub since: Option<DateTime<Utc>>,
    /// Only notes whose `tags` field is present and non-empty
    pub tagged_only: bool,
    /// Maximum number of rows returned
    pub limit: Option<usize>,
}

/// Durable, queryable record store.
///
/// Queries return records ordered by `created_at` descending, ties broken
/// by ascending `id`.
pub trait Store: Send + Sync {
    /// Append an analytics event
    fn insert_event(&self, event: &AnalyticsEvent) -> Result<()>;

    /// Read analytics events matching the query
    fn query_events(&self, query: &EventQuery) -> Result<Vec<AnalyticsEvent>>;

    /// Insert a new note
    fn insert_note(&self, note: &NoteRecord) -> Result<()>;

    /// Fetch a note by id
    fn get_note(&self, id: &str) -> Result<Option<NoteRecord>>;

    /// Read notes matching the query
    fn query_notes(&self, query: &NoteQuery) -> Result<Vec<NoteRecord>>;

    /// Apply a partial update; returns the updated note, or `None` if the id is unknown
    fn update_note(
        &self,
        id: &str,
        update: &NoteUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<NoteRecord>>;

    /// Delete a note; returns whether a row was removed
    fn delete_note(&self, id: &str) -> Result<bool>;
}

/// Resolve the owner filter for a request.
///
/// An absent or blank owner, or the anonymous sentinel, means "all owners".
pub fn owner_scope(user_id: Option<&str>) -> Option<String> {
    match user_id.map(str::trim) {
        None | Some("") | Some(ANONYMOUS_USER) => None,
        Some(id) => Some(id.to_string()),
    }
}
