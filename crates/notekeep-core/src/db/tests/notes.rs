use chrono::{DateTime, Duration, Utc};

use crate::analytics::{compute_usage_stats, popular_tags};
use crate::db::Database;
use crate::notes::{NoteRecord, NoteUpdate};
use crate::store::{NoteQuery, Store};
use crate::time::now;

pub(super) fn note(id: &str, user: &str, tags: Option<&str>) -> NoteRecord {
    note_at(id, user, tags, now())
}

fn note_at(id: &str, user: &str, tags: Option<&str>, created_at: DateTime<Utc>) -> NoteRecord {
    NoteRecord {
        id: id.to_string(),
        user_id: user.to_string(),
        title: format!("Title {}", id),
        content: format!("Body of {}", id),
        tags: tags.map(str::to_string),
        language: None,
        created_at,
        updated_at: created_at,
    }
}

#[test]
fn test_note_round_trip() {
    let db = Database::open_in_memory().unwrap();
    let mut original = note("n1", "u1", Some("rust, go"));
    original.language = Some("en".to_string());
    db.insert_note(&original).unwrap();

    assert_eq!(db.get_note("n1").unwrap(), Some(original));
    assert_eq!(db.get_note("missing").unwrap(), None);
}

#[test]
fn test_search_is_case_insensitive_and_escaped() {
    let db = Database::open_in_memory().unwrap();
    let mut percent = note("p", "u", None);
    percent.title = "100% coverage".to_string();
    db.insert_note(&percent).unwrap();
    db.insert_note(&note("plain", "u", None)).unwrap();

    let hits = db
        .query_notes(&NoteQuery {
            search: Some("BODY OF PLAIN".to_string()),
            ..NoteQuery::default()
        })
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "plain");

    let hits = db
        .query_notes(&NoteQuery {
            search: Some("0%".to_string()),
            ..NoteQuery::default()
        })
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "p");
}

#[test]
fn test_query_notes_tagged_only_and_limit() {
    let db = Database::open_in_memory().unwrap();
    let now = now();
    db.insert_note(&note_at("a", "u", Some("x"), now - Duration::hours(3)))
        .unwrap();
    db.insert_note(&note_at("b", "u", Some(""), now - Duration::hours(2)))
        .unwrap();
    db.insert_note(&note_at("c", "u", None, now - Duration::hours(1)))
        .unwrap();
    db.insert_note(&note_at("d", "u", Some("y"), now)).unwrap();

    let tagged: Vec<_> = db
        .query_notes(&NoteQuery {
            tagged_only: true,
            ..NoteQuery::default()
        })
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(tagged, vec!["d", "a"]);

    let limited = db
        .query_notes(&NoteQuery {
            limit: Some(2),
            ..NoteQuery::default()
        })
        .unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, "d");
}

#[test]
fn test_update_and_delete() {
    let db = Database::open_in_memory().unwrap();
    db.insert_note(&note("n1", "u", Some("old"))).unwrap();
    let later = now() + Duration::minutes(5);

    let updated = db
        .update_note(
            "n1",
            &NoteUpdate {
                title: Some("Renamed".to_string()),
                tags: Some(String::new()),
                ..NoteUpdate::default()
            },
            later,
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.tags, None);
    assert_eq!(updated.updated_at, later);
    assert_eq!(db.get_note("n1").unwrap(), Some(updated));

    assert!(db
        .update_note("missing", &NoteUpdate::default(), later)
        .unwrap()
        .is_none());

    assert!(db.delete_note("n1").unwrap());
    assert!(!db.delete_note("n1").unwrap());
}

#[test]
fn test_aggregations_over_sqlite() {
    let db = Database::open_in_memory().unwrap();
    let now = now();
    db.insert_note(&note_at("a", "alice", Some("Go, go, rust"), now))
        .unwrap();
    db.insert_note(&note_at("b", "alice", Some("rust"), now - Duration::days(10)))
        .unwrap();
    db.insert_note(&note_at("c", "bob", Some("zig"), now)).unwrap();

    let tags = popular_tags(&db, Some("alice"), 10).unwrap();
    assert_eq!(tags.total_unique_tags, 2);
    assert_eq!(tags.tags[0].tag, "go");
    assert_eq!(tags.tags[0].count, 2);

    let stats = compute_usage_stats(&db, Some("alice"), now).unwrap();
    assert_eq!(stats.total_notes, 2);
    assert_eq!(stats.notes_this_week, 1);
    assert_eq!(stats.notes_this_month, 2);
    assert_eq!(stats.languages_used["plain"], 2);
}
