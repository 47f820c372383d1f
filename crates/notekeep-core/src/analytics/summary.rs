//! Time-windowed event summary

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::events::AnalyticsEvent;
use crate::error::Result;
use crate::store::{owner_scope, EventQuery, Store};
use crate::time::local_day;
use crate::trace_time;

/// Derived view over the events of one window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_events: usize,
    /// event_type → count
    pub events_by_type: BTreeMap<String, usize>,
    /// local calendar day (`YYYY-MM-DD`) → count
    pub daily_activity: BTreeMap<String, usize>,
    /// Newest first
    pub recent_events: Vec<AnalyticsEvent>,
}

/// Parameters of a summary request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest<'a> {
    pub user_id: Option<&'a str>,
    pub days: u32,
    pub recent_limit: usize,
}

/// Start of a window of `days` ending at `now`
pub fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days))
}

/// Fold events into a summary.
///
/// Events older than `since` are dropped. The remaining events are ordered
/// newest first and the head of that ordering becomes `recent_events`.
pub fn summarize(
    mut events: Vec<AnalyticsEvent>,
    since: DateTime<Utc>,
    recent_limit: usize,
) -> AnalyticsSummary {
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    events.retain(|e| e.created_at >= since);

    let (events_by_type, daily_activity) = events.iter().fold(
        (BTreeMap::new(), BTreeMap::new()),
        |(mut by_type, mut by_day), event| {
            *by_type
                .entry(event.event_type.as_str().to_string())
                .or_insert(0) += 1;
            *by_day.entry(local_day(&event.created_at)).or_insert(0) += 1;
            (by_type, by_day)
        },
    );

    let total_events = events.len();
    events.truncate(recent_limit);

    AnalyticsSummary {
        total_events,
        events_by_type,
        daily_activity,
        recent_events: events,
    }
}

/// Read the window from the store and summarize it
#[tracing::instrument(skip(store, now), fields(user_id = ?request.user_id, days = request.days))]
pub fn compute_summary(
    store: &dyn Store,
    request: &SummaryRequest<'_>,
    now: DateTime<Utc>,
) -> Result<AnalyticsSummary> {
    let start = Instant::now();
    let since = window_start(now, request.days);

    let events = store.query_events(&EventQuery {
        user_id: owner_scope(request.user_id),
        since: Some(since),
    })?;
    trace_time!(start, "query_events", event_count = events.len());

    let summary = summarize(events, since, request.recent_limit);
    trace_time!(start, "summarize");
    Ok(summary)
}
