//! Axum route handlers for the memory wall HTTP API.

use crate::config::{Config, StorageKind};
use crate::error::AppError;
use crate::pipeline::{ImagePayload, MemoryWall, UploadedFile};
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use memory_wall_types::*;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub struct AppState {
    pub wall: Arc<MemoryWall>,
    pub start_time: Instant,
    pub max_upload_files: usize,
}

pub fn router(state: Arc<AppState>, config: &Config) -> axum::Router {
    let mut app = axum::Router::new()
        .route("/api/messages", get(list_messages).post(post_message))
        .route("/api/memories", get(list_memories).post(create_memory))
        .route("/api/memories/upload", post(upload_images))
        .route("/api/images/:id", get(get_image))
        .route("/api/status", get(status))
        .with_state(state);

    if config.storage == StorageKind::Local {
        app = app.nest_service("/uploads", ServeDir::new(&config.upload_dir));
    }

    app.layer(DefaultBodyLimit::max(config.max_request_bytes()))
        .layer(CorsLayer::permissive())
}

// =====================================================
// Guestbook
// =====================================================

// GET /api/messages
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Message>>, AppError> {
    state.wall.list_messages().map(Json)
}

// POST /api/messages
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<Json<Message>, AppError> {
    let Json(req) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    state.wall.post_message(req).map(Json)
}

// =====================================================
// Images
// =====================================================

// POST /api/memories/upload
pub async fn upload_images(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("images") {
            continue;
        }
        if files.len() == state.max_upload_files {
            return Err(AppError::Validation(format!(
                "Too many files: at most {} per upload",
                state.max_upload_files
            )));
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?.to_vec();
        files.push(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }

    state.wall.upload(files).await.map(Json)
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    size: Option<String>,
}

// GET /api/images/:id?size=thumbnail|original
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, AppError> {
    let size = ImageSize::from_query(query.size.as_deref());
    let response = match state.wall.fetch_image(&id, size).await? {
        ImagePayload::Bytes(image) => (
            [
                (header::CONTENT_TYPE, image.content_type.clone()),
                (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
            ],
            image.bytes.clone(),
        )
            .into_response(),
        ImagePayload::Redirect(url) => (StatusCode::FOUND, [(header::LOCATION, url)]).into_response(),
    };
    Ok(response)
}

// =====================================================
// Memories
// =====================================================

// POST /api/memories
pub async fn create_memory(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateMemoryRequest>, JsonRejection>,
) -> Result<Json<MemoryView>, AppError> {
    let Json(req) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    state.wall.create_memory(req).await.map(Json)
}

/// Raw strings so junk like `page=abc` falls back to defaults instead of 400.
#[derive(Debug, Deserialize)]
pub struct ListMemoriesQuery {
    page: Option<String>,
    limit: Option<String>,
}

// GET /api/memories?page&limit
pub async fn list_memories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListMemoriesQuery>,
) -> Result<Json<Vec<MemorySummary>>, AppError> {
    let page = parse_positive(query.page.as_deref()).unwrap_or(1);
    let limit = parse_positive(query.limit.as_deref()).unwrap_or(10);
    state.wall.list_memories(page, limit).map(Json)
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
}

// =====================================================
// Service
// =====================================================

// GET /api/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<ServiceStatus> {
    Json(state.wall.status(state.start_time.elapsed().as_secs()))
}
