//! Note CRUD handlers

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;

use notekeep_core::analytics::{parse_limit, MAX_LIMIT};
use notekeep_core::notes::{self, ListOptions, NewNote, NoteRecord, NoteUpdate};
use notekeep_core::time;

use super::error::ApiResult;
use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub success: bool,
    pub data: NoteRecord,
}

impl NoteResponse {
    fn new(data: NoteRecord) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<NoteRecord>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/notes
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewNote>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<NoteResponse>)> {
    let Json(new_note) = payload?;
    let note = state
        .with_store(move |store| notes::create_note(store, new_note, time::now()))
        .await?;
    Ok((StatusCode::CREATED, NoteResponse::new(note)))
}

/// GET /api/notes
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<NoteListResponse>> {
    // blank means unlimited, same as absent
    let limit = match params.get("limit").map(|raw| raw.trim()) {
        Some(raw) if !raw.is_empty() => Some(parse_limit(Some(raw), MAX_LIMIT)?),
        _ => None,
    };

    let found = state
        .with_store(move |store| {
            notes::list_notes(
                store,
                ListOptions {
                    user_id: params.get("user_id").map(String::as_str),
                    search: params.get("search").map(String::as_str),
                    limit,
                },
            )
        })
        .await?;

    Ok(Json(NoteListResponse {
        success: true,
        count: found.len(),
        data: found,
    }))
}

/// GET /api/notes/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<NoteResponse>> {
    let note = state
        .with_store(move |store| notes::get_note(store, &id))
        .await?;
    Ok(NoteResponse::new(note))
}

/// PUT /api/notes/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NoteUpdate>, JsonRejection>,
) -> ApiResult<Json<NoteResponse>> {
    let Json(update) = payload?;
    let note = state
        .with_store(move |store| notes::update_note(store, &id, update, time::now()))
        .await?;
    Ok(NoteResponse::new(note))
}

/// DELETE /api/notes/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = id.clone();
    state
        .with_store(move |store| notes::delete_note(store, &deleted))
        .await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: format!("Note {} deleted", id),
    }))
}
