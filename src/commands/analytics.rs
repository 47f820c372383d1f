//! Local analytics commands
//!
//! Each command prints the same envelope the HTTP API returns.

use serde_json::{Map, Value};

use notekeep_core::analytics::{
    compute_summary, compute_usage_stats, parse_days, parse_limit, popular_tags, track_event,
    RequestContext, StatsResponse, SummaryRequest, SummaryResponse, TagsResponse, TrackResponse,
};
use notekeep_core::config::ServerConfig;
use notekeep_core::error::{NotekeepError, Result};
use notekeep_core::store::Store;
use notekeep_core::time;

use super::print_json;

fn cli_context() -> RequestContext {
    RequestContext {
        user_agent: Some(format!("notekeep-cli/{}", env!("CARGO_PKG_VERSION"))),
        ip_address: None,
    }
}

/// Build the ingestion payload from command-line arguments
fn track_payload(
    event_type: &str,
    user: Option<&str>,
    session: Option<&str>,
    data: Option<&str>,
) -> Result<Value> {
    let mut payload = Map::new();
    payload.insert("event_type".to_string(), Value::from(event_type));
    if let Some(user) = user {
        payload.insert("user_id".to_string(), Value::from(user));
    }
    if let Some(session) = session {
        payload.insert("session_id".to_string(), Value::from(session));
    }
    if let Some(data) = data {
        let parsed: Value = serde_json::from_str(data)
            .map_err(|e| NotekeepError::validation("event_data", format!("invalid JSON: {}", e)))?;
        payload.insert("event_data".to_string(), parsed);
    }
    Ok(Value::Object(payload))
}

pub fn execute_track(
    store: &dyn Store,
    event_type: &str,
    user: Option<&str>,
    session: Option<&str>,
    data: Option<&str>,
) -> Result<()> {
    let payload = track_payload(event_type, user, session, data)?;
    let outcome = track_event(store, &payload, &cli_context(), time::now())?;
    print_json(&TrackResponse::from(outcome))
}

pub fn execute_summary(
    store: &dyn Store,
    config: &ServerConfig,
    user: Option<&str>,
    days: Option<&str>,
) -> Result<()> {
    let days = parse_days(days, config.default_summary_days)?;
    let request = SummaryRequest {
        user_id: user,
        days,
        recent_limit: config.recent_events_limit,
    };
    let summary = compute_summary(store, &request, time::now())?;
    print_json(&SummaryResponse::new(summary, days, user))
}

pub fn execute_tags(
    store: &dyn Store,
    config: &ServerConfig,
    user: Option<&str>,
    limit: Option<&str>,
) -> Result<()> {
    let limit = parse_limit(limit, config.default_tag_limit)?;
    let tags = popular_tags(store, user, limit)?;
    print_json(&TagsResponse::from(tags))
}

pub fn execute_stats(store: &dyn Store, user: Option<&str>) -> Result<()> {
    let stats = compute_usage_stats(store, user, time::now())?;
    print_json(&StatsResponse::new(stats, user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_payload_includes_only_given_fields() {
        let payload = track_payload("page_view", Some("u1"), None, Some(r#"{"path":"/"}"#)).unwrap();
        assert_eq!(payload["event_type"], "page_view");
        assert_eq!(payload["user_id"], "u1");
        assert_eq!(payload["event_data"]["path"], "/");
        assert!(payload.get("session_id").is_none());
    }

    #[test]
    fn test_track_payload_rejects_malformed_data() {
        let err = track_payload("page_view", None, None, Some("{not json")).unwrap_err();
        assert_eq!(err.field(), Some("event_data"));
    }

    #[test]
    fn test_cli_context_identifies_client() {
        let context = cli_context();
        assert!(context.user_agent.unwrap().starts_with("notekeep-cli/"));
        assert_eq!(context.ip_address, None);
    }
}
