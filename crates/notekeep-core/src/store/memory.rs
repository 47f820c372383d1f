//! In-process store with optional fault injection

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use super::{EventQuery, NoteQuery, Store};
use crate::analytics::AnalyticsEvent;
use crate::error::{NotekeepError, Result};
use crate::notes::{NoteRecord, NoteUpdate};

/// Store keeping every record in memory.
///
/// Writes and reads can be made to fail on demand, which is how degraded
/// storage is exercised without a real backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<Vec<AnalyticsEvent>>,
    notes: RwLock<Vec<NoteRecord>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

fn read_lock<'a, T>(lock: &'a RwLock<T>, resource: &str) -> Result<RwLockReadGuard<'a, T>> {
    lock.read()
        .map_err(|_| NotekeepError::Storage(format!("{} lock poisoned", resource)))
}

fn write_lock<'a, T>(lock: &'a RwLock<T>, resource: &str) -> Result<RwLockWriteGuard<'a, T>> {
    lock.write()
        .map_err(|_| NotekeepError::Storage(format!("{} lock poisoned", resource)))
}

fn newest_first<T>(records: &mut [T], key: impl Fn(&T) -> (&DateTime<Utc>, &str)) {
    records.sort_by(|a, b| {
        let (a_created, a_id) = key(a);
        let (b_created, b_id) = key(b);
        b_created.cmp(a_created).then_with(|| a_id.cmp(b_id))
    });
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a storage error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent read fail with a storage error
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of stored events
    pub fn event_count(&self) -> usize {
        self.events.read().map(|events| events.len()).unwrap_or(0)
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(NotekeepError::Storage("write rejected by store".to_string()));
        }
        Ok(())
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(NotekeepError::Storage("read rejected by store".to_string()));
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    fn insert_event(&self, event: &AnalyticsEvent) -> Result<()> {
        self.check_write()?;
        write_lock(&self.events, "events")?.push(event.clone());
        Ok(())
    }

    fn query_events(&self, query: &EventQuery) -> Result<Vec<AnalyticsEvent>> {
        self.check_read()?;
        let mut events: Vec<AnalyticsEvent> = read_lock(&self.events, "events")?
            .iter()
            .filter(|e| query.user_id.as_ref().map_or(true, |u| &e.user_id == u))
            .filter(|e| query.since.map_or(true, |since| e.created_at >= since))
            .cloned()
            .collect();
        newest_first(&mut events, |e| (&e.created_at, e.id.as_str()));
        Ok(events)
    }

    fn insert_note(&self, note: &NoteRecord) -> Result<()> {
        self.check_write()?;
        let mut notes = write_lock(&self.notes, "notes")?;
        if notes.iter().any(|n| n.id == note.id) {
            return Err(NotekeepError::Storage(format!(
                "note {} already exists",
                note.id
            )));
        }
        notes.push(note.clone());
        Ok(())
    }

    fn get_note(&self, id: &str) -> Result<Option<NoteRecord>> {
        self.check_read()?;
        Ok(read_lock(&self.notes, "notes")?
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    fn query_notes(&self, query: &NoteQuery) -> Result<Vec<NoteRecord>> {
        self.check_read()?;
        let needle = query.search.as_ref().map(|s| s.to_lowercase());

        let mut notes: Vec<NoteRecord> = read_lock(&self.notes, "notes")?
            .iter()
            .filter(|n| query.user_id.as_ref().map_or(true, |u| &n.user_id == u))
            .filter(|n| query.since.map_or(true, |since| n.created_at >= since))
            .filter(|n| !query.tagged_only || n.tags.as_deref().is_some_and(|t| !t.is_empty()))
            .filter(|n| {
                needle.as_ref().map_or(true, |needle| {
                    n.title.to_lowercase().contains(needle)
                        || n.content.to_lowercase().contains(needle)
                })
            })
            .cloned()
            .collect();

        newest_first(&mut notes, |n| (&n.created_at, n.id.as_str()));
        if let Some(limit) = query.limit {
            notes.truncate(limit);
        }
        Ok(notes)
    }

    fn update_note(
        &self,
        id: &str,
        update: &NoteUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<NoteRecord>> {
        self.check_write()?;
        let mut notes = write_lock(&self.notes, "notes")?;
        let Some(note) = notes.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };

        update.apply_to(note, updated_at);

        Ok(Some(note.clone()))
    }

    fn delete_note(&self, id: &str) -> Result<bool> {
        self.check_write()?;
        let mut notes = write_lock(&self.notes, "notes")?;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        Ok(notes.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{EventType, RequestContext, TrackRequest};
    use chrono::Duration;

    fn event_at(user: &str, created_at: DateTime<Utc>) -> AnalyticsEvent {
        AnalyticsEvent::normalize(
            TrackRequest::new(EventType::PageView).with_user(user),
            &RequestContext::default(),
            created_at,
        )
    }

    #[test]
    fn test_query_events_orders_and_filters() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert_event(&event_at("a", now - Duration::days(2))).unwrap();
        store.insert_event(&event_at("b", now)).unwrap();
        store.insert_event(&event_at("a", now - Duration::days(1))).unwrap();

        let all = store.query_events(&EventQuery::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        let scoped = store
            .query_events(&EventQuery {
                user_id: Some("a".to_string()),
                since: Some(now - Duration::hours(36)),
            })
            .unwrap();
        assert_eq!(scoped.len(), 1);
    }

    #[test]
    fn test_fault_injection() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        assert!(store.insert_event(&event_at("a", Utc::now())).is_err());
        assert_eq!(store.event_count(), 0);

        store.set_fail_writes(false);
        store.set_fail_reads(true);
        store.insert_event(&event_at("a", Utc::now())).unwrap();
        assert!(store.query_events(&EventQuery::default()).is_err());
    }

    #[test]
    fn test_update_with_empty_tags_clears_them() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let note = NoteRecord {
            id: "n1".to_string(),
            user_id: "a".to_string(),
            title: "t".to_string(),
            content: String::new(),
            tags: Some("x".to_string()),
            language: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_note(&note).unwrap();

        let updated = store
            .update_note(
                "n1",
                &NoteUpdate {
                    tags: Some(String::new()),
                    ..NoteUpdate::default()
                },
                now,
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.tags, None);
        assert!(store.update_note("nope", &NoteUpdate::default(), now).unwrap().is_none());
    }
}
