//! Axum route handlers for the notes REST API.

use crate::error::ApiError;
use crate::store::NoteStore;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use notes_types::{CreateNoteRequest, Note, ServiceStatus, UpdateNoteRequest};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
    pub store: NoteStore,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: NoteStore) -> Self {
        Self {
            store,
            start_time: Instant::now(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/", get(list_notes).post(create_note))
        .route(
            "/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/health", get(health))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

// GET /notes/
pub async fn list_notes(State(state): State<Arc<AppState>>) -> Json<Vec<Note>> {
    let notes = state.store.list();
    log::debug!("Listing {} notes", notes.len());
    Json(notes)
}

// POST /notes/
pub async fn create_note(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let Json(req) = payload?;
    let note = state.store.create(&req)?;
    log::info!("Created note {}", note.id);
    Ok((StatusCode::CREATED, Json(note)))
}

// GET /notes/{id}
pub async fn get_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    log::debug!("Fetching note {}", id);
    Ok(Json(state.store.get(&id)?))
}

// PUT /notes/{id}
pub async fn update_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let Json(req) = payload?;
    let note = state.store.update(&id, &req)?;
    log::info!("Updated note {}", note.id);
    Ok(Json(note))
}

// DELETE /notes/{id}
pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&id)?;
    log::info!("Deleted note {}", id);
    Ok(StatusCode::NO_CONTENT)
}

// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        running: true,
        version: VERSION.to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        total_notes: state.store.len(),
    })
}
