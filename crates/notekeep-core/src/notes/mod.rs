//! Note records and validated CRUD over a [`Store`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::ANONYMOUS_USER;
use crate::bail_validation;
use crate::error::{NotekeepError, Result};
use crate::store::{owner_scope, NoteQuery, Store};

/// Maximum title length, in characters
pub const MAX_TITLE_CHARS: usize = 500;

/// A stored note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    /// Comma-separated free-text labels
    pub tags: Option<String>,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a note
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewNote {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Partial update of a note; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NoteUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl NoteUpdate {
    /// Apply the present fields to `note`; an empty tags or language clears it
    pub fn apply_to(&self, note: &mut NoteRecord, updated_at: DateTime<Utc>) {
        if let Some(title) = &self.title {
            note.title = title.clone();
        }
        if let Some(content) = &self.content {
            note.content = content.clone();
        }
        if let Some(tags) = &self.tags {
            note.tags = clearable(tags);
        }
        if let Some(language) = &self.language {
            note.language = clearable(language);
        }
        note.updated_at = updated_at;
    }
}

/// Options for listing notes
#[derive(Debug, Clone, Default)]
pub struct ListOptions<'a> {
    pub user_id: Option<&'a str>,
    pub search: Option<&'a str>,
    pub limit: Option<usize>,
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        bail_validation!("title", "must not be empty");
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        bail_validation!(
            "title",
            format!("must be at most {} characters", MAX_TITLE_CHARS)
        );
    }
    Ok(title.to_string())
}

/// Value stored for a cleared optional field: an empty string clears it
fn clearable(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Blank optional text is stored as absent
fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Create a note
#[tracing::instrument(skip_all)]
pub fn create_note(store: &dyn Store, new_note: NewNote, now: DateTime<Utc>) -> Result<NoteRecord> {
    let title = validate_title(&new_note.title)?;

    let note = NoteRecord {
        id: ulid::Ulid::new().to_string(),
        user_id: non_blank(new_note.user_id).unwrap_or_else(|| ANONYMOUS_USER.to_string()),
        title,
        content: new_note.content.unwrap_or_default(),
        tags: non_blank(new_note.tags),
        language: non_blank(new_note.language),
        created_at: now,
        updated_at: now,
    };

    store.insert_note(&note)?;
    tracing::debug!(note_id = %note.id, user_id = %note.user_id, "note created");
    Ok(note)
}

/// Fetch a note by id
pub fn get_note(store: &dyn Store, id: &str) -> Result<NoteRecord> {
    store
        .get_note(id)?
        .ok_or_else(|| NotekeepError::not_found("note", id))
}

/// List notes, newest first
pub fn list_notes(store: &dyn Store, options: ListOptions<'_>) -> Result<Vec<NoteRecord>> {
    let query = NoteQuery {
        user_id: owner_scope(options.user_id),
        search: options
            .search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        limit: options.limit,
        ..NoteQuery::default()
    };
    store.query_notes(&query)
}

/// Apply a partial update to a note
#[tracing::instrument(skip(store, update, now))]
pub fn update_note(
    store: &dyn Store,
    id: &str,
    update: NoteUpdate,
    now: DateTime<Utc>,
) -> Result<NoteRecord> {
    let update = NoteUpdate {
        title: update.title.as_deref().map(validate_title).transpose()?,
        content: update.content,
        tags: update.tags.map(|t| t.trim().to_string()),
        language: update.language.map(|l| l.trim().to_string()),
    };

    store
        .update_note(id, &update, now)?
        .ok_or_else(|| NotekeepError::not_found("note", id))
}

/// Delete a note
#[tracing::instrument(skip(store))]
pub fn delete_note(store: &dyn Store, id: &str) -> Result<()> {
    if store.delete_note(id)? {
        Ok(())
    } else {
        Err(NotekeepError::not_found("note", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorStatus;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn new_note(title: &str) -> NewNote {
        NewNote {
            title: title.to_string(),
            ..NewNote::default()
        }
    }

    #[test]
    fn test_create_applies_defaults() {
        let store = MemoryStore::new();
        let note = create_note(&store, new_note("  Groceries "), Utc::now()).unwrap();

        assert_eq!(note.title, "Groceries");
        assert_eq!(note.user_id, ANONYMOUS_USER);
        assert_eq!(note.content, "");
        assert_eq!(note.tags, None);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let store = MemoryStore::new();
        let err = create_note(&store, new_note("   "), Utc::now()).unwrap_err();
        assert_eq!(err.field(), Some("title"));
        assert!(store.query_notes(&NoteQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn test_create_rejects_overlong_title() {
        let store = MemoryStore::new();
        let title = "x".repeat(MAX_TITLE_CHARS + 1);
        let err = create_note(&store, new_note(&title), Utc::now()).unwrap_err();
        assert_eq!(err.field(), Some("title"));
    }

    #[test]
    fn test_get_missing_note_is_not_found() {
        let store = MemoryStore::new();
        let err = get_note(&store, "missing").unwrap_err();
        assert_eq!(err.status(), ErrorStatus::NotFound);
    }

    #[test]
    fn test_update_changes_fields_and_timestamp() {
        let store = MemoryStore::new();
        let created_at = Utc::now() - Duration::hours(1);
        let note = create_note(&store, new_note("Draft"), created_at).unwrap();

        let later = Utc::now();
        let updated = update_note(
            &store,
            &note.id,
            NoteUpdate {
                title: Some("Final".to_string()),
                tags: Some("work, ideas".to_string()),
                ..NoteUpdate::default()
            },
            later,
        )
        .unwrap();

        assert_eq!(updated.title, "Final");
        assert_eq!(updated.tags.as_deref(), Some("work, ideas"));
        assert_eq!(updated.created_at, created_at);
        assert_eq!(updated.updated_at, later);
    }

    #[test]
    fn test_update_rejects_blank_title() {
        let store = MemoryStore::new();
        let note = create_note(&store, new_note("Draft"), Utc::now()).unwrap();
        let err = update_note(
            &store,
            &note.id,
            NoteUpdate {
                title: Some(" ".to_string()),
                ..NoteUpdate::default()
            },
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("title"));
    }

    #[test]
    fn test_delete_then_missing() {
        let store = MemoryStore::new();
        let note = create_note(&store, new_note("Ephemeral"), Utc::now()).unwrap();

        delete_note(&store, &note.id).unwrap();
        let err = delete_note(&store, &note.id).unwrap_err();
        assert_eq!(err.status(), ErrorStatus::NotFound);
    }

    #[test]
    fn test_list_search_is_case_insensitive_and_scoped() {
        let store = MemoryStore::new();
        let now = Utc::now();
        create_note(
            &store,
            NewNote {
                title: "Rust borrow checker".to_string(),
                user_id: Some("alice".to_string()),
                ..NewNote::default()
            },
            now,
        )
        .unwrap();
        create_note(
            &store,
            NewNote {
                title: "Shopping".to_string(),
                content: Some("buy RUSTPROOF paint".to_string()),
                user_id: Some("bob".to_string()),
                ..NewNote::default()
            },
            now,
        )
        .unwrap();

        let all = list_notes(
            &store,
            ListOptions {
                search: Some("rust"),
                ..ListOptions::default()
            },
        )
        .unwrap();
        assert_eq!(all.len(), 2);

        let alice = list_notes(
            &store,
            ListOptions {
                user_id: Some("alice"),
                search: Some("RUST"),
                ..ListOptions::default()
            },
        )
        .unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].title, "Rust borrow checker");
    }
}
