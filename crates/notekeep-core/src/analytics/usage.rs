//! Note usage statistics

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::notes::NoteRecord;
use crate::store::{owner_scope, NoteQuery, Store};
use crate::time::local_hour;

/// Language bucket for notes without one
pub const DEFAULT_LANGUAGE: &str = "plain";

/// Note counts and distributions for one owner scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_notes: usize,
    pub notes_this_week: usize,
    pub notes_this_month: usize,
    /// language → count
    pub languages_used: BTreeMap<String, usize>,
    /// local hour of day (0-23) → count
    pub creation_pattern: BTreeMap<u32, usize>,
}

/// Fold notes into usage statistics relative to `now`
pub fn usage_stats(notes: &[NoteRecord], now: DateTime<Utc>) -> UsageStats {
    let week_start = now - Duration::days(7);
    let month_start = now - Duration::days(30);

    notes.iter().fold(UsageStats::default(), |mut stats, note| {
        stats.total_notes += 1;
        if note.created_at >= week_start {
            stats.notes_this_week += 1;
        }
        if note.created_at >= month_start {
            stats.notes_this_month += 1;
        }

        let language = note
            .language
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE);
        *stats.languages_used.entry(language.to_string()).or_insert(0) += 1;
        *stats
            .creation_pattern
            .entry(local_hour(&note.created_at))
            .or_insert(0) += 1;

        stats
    })
}

/// Read the owner's notes and compute usage statistics
#[tracing::instrument(skip(store, now))]
pub fn compute_usage_stats(
    store: &dyn Store,
    user_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<UsageStats> {
    let notes = store.query_notes(&NoteQuery {
        user_id: owner_scope(user_id),
        ..NoteQuery::default()
    })?;
    Ok(usage_stats(&notes, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn note(created_at: DateTime<Utc>, language: Option<&str>) -> NoteRecord {
        NoteRecord {
            id: ulid::Ulid::new().to_string(),
            user_id: "u".to_string(),
            title: "t".to_string(),
            content: String::new(),
            tags: None,
            language: language.map(str::to_string),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_empty_notes_yield_zeroes() {
        let stats = usage_stats(&[], Utc::now());
        assert_eq!(stats.total_notes, 0);
        assert_eq!(stats.notes_this_week, 0);
        assert_eq!(stats.notes_this_month, 0);
        assert!(stats.languages_used.is_empty());
        assert!(stats.creation_pattern.is_empty());
    }

    #[test]
    fn test_recency_buckets() {
        let now = Utc::now();
        let notes = vec![
            note(now - Duration::days(1), None),
            note(now - Duration::days(10), None),
            note(now - Duration::days(45), None),
        ];
        let stats = usage_stats(&notes, now);
        assert_eq!(stats.total_notes, 3);
        assert_eq!(stats.notes_this_week, 1);
        assert_eq!(stats.notes_this_month, 2);
    }

    #[test]
    fn test_languages_default_to_plain() {
        let now = Utc::now();
        let notes = vec![
            note(now, Some("en")),
            note(now, Some("en")),
            note(now, None),
            note(now, Some("")),
        ];
        let stats = usage_stats(&notes, now);
        assert_eq!(stats.languages_used["en"], 2);
        assert_eq!(stats.languages_used[DEFAULT_LANGUAGE], 2);
    }

    #[test]
    fn test_creation_pattern_uses_local_hour() {
        let created = Local
            .with_ymd_and_hms(2024, 6, 1, 14, 5, 0)
            .unwrap()
            .with_timezone(&Utc);
        let stats = usage_stats(&[note(created, None)], Utc::now());
        assert_eq!(stats.creation_pattern.get(&14), Some(&1));
        assert_eq!(stats.creation_pattern.len(), 1);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["creation_pattern"]["14"], 1);
    }
}
