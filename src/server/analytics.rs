//! Analytics handlers: event ingestion and the three aggregation views

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::Json;
use serde_json::Value;

use notekeep_core::analytics::{
    compute_summary, compute_usage_stats, parse_days, parse_limit, popular_tags, prepare_event,
    RequestContext, StatsResponse, SummaryRequest, SummaryResponse, TagsResponse, TrackResponse,
};
use notekeep_core::time;

use super::error::ApiResult;
use super::state::AppState;

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Client address as reported by a fronting proxy
fn client_ip(headers: &HeaderMap) -> Option<String> {
    header_value(headers, "x-forwarded-for")
        .and_then(|chain| {
            chain
                .split(',')
                .next()
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
                .map(str::to_string)
        })
        .or_else(|| header_value(headers, "x-real-ip"))
}

pub(super) fn request_context(headers: &HeaderMap) -> RequestContext {
    RequestContext {
        user_agent: header_value(headers, header::USER_AGENT.as_str()),
        ip_address: client_ip(headers),
    }
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params.get(name).map(String::as_str)
}

/// POST /api/analytics/track
pub async fn track(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<TrackResponse>> {
    let Json(payload) = payload?;
    let event = prepare_event(&payload, &request_context(&headers), time::now())?;
    let outcome = state.deliver(event).await;
    Ok(Json(TrackResponse::from(outcome)))
}

/// GET /api/analytics/summary
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<SummaryResponse>> {
    let days = parse_days(param(&params, "days"), state.config().default_summary_days)?;
    let recent_limit = state.config().recent_events_limit;
    let user_id = param(&params, "user_id").map(str::to_string);

    let scope = user_id.clone();
    let summary = state
        .with_store(move |store| {
            let request = SummaryRequest {
                user_id: scope.as_deref(),
                days,
                recent_limit,
            };
            compute_summary(store, &request, time::now())
        })
        .await?;

    Ok(Json(SummaryResponse::new(summary, days, user_id.as_deref())))
}

/// GET /api/analytics/tags
pub async fn tags(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<TagsResponse>> {
    let limit = parse_limit(param(&params, "limit"), state.config().default_tag_limit)?;
    let user_id = param(&params, "user_id").map(str::to_string);

    let ranked = state
        .with_store(move |store| popular_tags(store, user_id.as_deref(), limit))
        .await?;

    Ok(Json(TagsResponse::from(ranked)))
}

/// GET /api/analytics/stats
pub async fn stats(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<StatsResponse>> {
    let user_id = param(&params, "user_id").map(str::to_string);

    let scope = user_id.clone();
    let stats = state
        .with_store(move |store| compute_usage_stats(store, scope.as_deref(), time::now()))
        .await?;

    Ok(Json(StatsResponse::new(stats, user_id.as_deref())))
}
