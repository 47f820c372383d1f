//! Usage analytics: event ingestion and on-demand aggregation

mod events;
mod ingest;
mod summary;
mod tags;
mod usage;

pub use events::{
    AnalyticsEvent, EventType, Location, RequestContext, TrackRequest, ANONYMOUS_USER,
    UNKNOWN_PROVENANCE,
};
pub use ingest::{deliver, prepare_event, track_event, unconfirmed, IngestOutcome};
pub use summary::{compute_summary, summarize, window_start, AnalyticsSummary, SummaryRequest};
pub use tags::{popular_tags, rank_tags, split_tags, PopularTags, TagCount};
pub use usage::{compute_usage_stats, usage_stats, UsageStats, DEFAULT_LANGUAGE};

use serde::{Deserialize, Serialize};

use crate::error::{NotekeepError, Result};
use crate::store::owner_scope;

/// Largest accepted summary window
pub const MAX_DAYS: u32 = 3650;
/// Largest accepted tag ranking size
pub const MAX_LIMIT: usize = 1000;

/// Label echoed back for the owner scope of a request
pub fn scope_label(user_id: Option<&str>) -> String {
    owner_scope(user_id).unwrap_or_else(|| "all".to_string())
}

fn parse_bounded<T>(field: &str, raw: Option<&str>, default: T, max: T) -> Result<T>
where
    T: std::str::FromStr + PartialOrd + From<u8> + std::fmt::Display + Copy,
{
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };

    match raw.parse::<T>() {
        Ok(value) if value >= T::from(1) && value <= max => Ok(value),
        _ => Err(NotekeepError::validation(
            field,
            format!("'{}' is not an integer between 1 and {}", raw, max),
        )),
    }
}

/// Parse the `days` query parameter
pub fn parse_days(raw: Option<&str>, default: u32) -> Result<u32> {
    parse_bounded("days", raw, default, MAX_DAYS)
}

/// Parse the `limit` query parameter
pub fn parse_limit(raw: Option<&str>, default: usize) -> Result<usize> {
    parse_bounded("limit", raw, default, MAX_LIMIT)
}

/// Response envelope for event ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<AnalyticsEvent>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<IngestOutcome> for TrackResponse {
    fn from(outcome: IngestOutcome) -> Self {
        let warning = outcome.warning();
        match outcome {
            IngestOutcome::Delivered(event) => Self {
                success: true,
                data: Some(event),
                message: "Event tracked successfully".to_string(),
                warning: None,
            },
            IngestOutcome::Unconfirmed { .. } => Self {
                success: true,
                data: None,
                message: "Event received".to_string(),
                warning,
            },
        }
    }
}

/// Response envelope for the event summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub data: AnalyticsSummary,
    pub period: String,
    pub user_id: String,
}

impl SummaryResponse {
    pub fn new(data: AnalyticsSummary, days: u32, user_id: Option<&str>) -> Self {
        Self {
            success: true,
            data,
            period: format!("{} days", days),
            user_id: scope_label(user_id),
        }
    }
}

/// Response envelope for popular tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsResponse {
    pub success: bool,
    pub data: Vec<TagCount>,
    pub total_unique_tags: usize,
}

impl From<PopularTags> for TagsResponse {
    fn from(tags: PopularTags) -> Self {
        Self {
            success: true,
            data: tags.tags,
            total_unique_tags: tags.total_unique_tags,
        }
    }
}

/// Response envelope for usage statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub success: bool,
    pub data: UsageStats,
    pub user_id: String,
}

impl StatsResponse {
    pub fn new(data: UsageStats, user_id: Option<&str>) -> Self {
        Self {
            success: true,
            data,
            user_id: scope_label(user_id),
        }
    }
}
