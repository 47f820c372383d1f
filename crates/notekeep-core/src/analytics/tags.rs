//! Tag frequency ranking over notes

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::notes::NoteRecord;
use crate::store::{owner_scope, NoteQuery, Store};

/// One ranked tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Ranked tags plus the number of distinct tags before truncation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularTags {
    pub tags: Vec<TagCount>,
    pub total_unique_tags: usize,
}

/// Split a comma-separated tag field into normalized tags.
///
/// Pieces are trimmed and lower-cased; empty pieces are skipped.
pub fn split_tags(tags: &str) -> impl Iterator<Item = String> + '_ {
    tags.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
}

/// Count every tag occurrence and rank by count.
///
/// Ties keep first-seen order over `notes` as given.
pub fn rank_tags(notes: &[NoteRecord], limit: usize) -> PopularTags {
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<TagCount> = Vec::new();

    for tag in notes
        .iter()
        .filter_map(|n| n.tags.as_deref())
        .flat_map(split_tags)
    {
        match position.get(&tag) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                position.insert(tag.clone(), counts.len());
                counts.push(TagCount { tag, count: 1 });
            }
        }
    }

    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));

    let total_unique_tags = counts.len();
    counts.truncate(limit);

    PopularTags {
        tags: counts,
        total_unique_tags,
    }
}

/// Read tagged notes from the store and rank their tags
#[tracing::instrument(skip(store))]
pub fn popular_tags(store: &dyn Store, user_id: Option<&str>, limit: usize) -> Result<PopularTags> {
    let notes = store.query_notes(&NoteQuery {
        user_id: owner_scope(user_id),
        tagged_only: true,
        ..NoteQuery::default()
    })?;
    tracing::debug!(note_count = notes.len(), "ranking tags");
    Ok(rank_tags(&notes, limit))
}
