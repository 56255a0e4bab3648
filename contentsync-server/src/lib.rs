//! HTTP API of the contentsync mock remote.
//!
//! Serves the content endpoint the sync client talks to, backed by a
//! directory of JSON files (`<menu>/<submenu>.json`).

mod content_dir;
mod error;

pub use content_dir::ContentDir;
pub use error::ApiError;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use contentsync_types::{ContentRecord, PageId, ValidationError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

/// Body returned by a successful write.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    pub saved_at: String,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn put_content_handler(
    State(dir): State<Arc<ContentDir>>,
    Path((menu, submenu)): Path<(String, String)>,
    payload: Result<Json<ContentRecord>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let page_id = PageId::from_parts(&menu, &submenu)?;
    let Json(record) = payload?;

    if record.page_id != page_id {
        return Err(ApiError::PageMismatch {
            path: page_id.to_string(),
            body: record.page_id.to_string(),
        });
    }
    if record.title.trim().is_empty() {
        return Err(ValidationError::MissingField("title").into());
    }

    dir.save(&record).await?;
    info!("Saved {}", page_id);

    Ok(Json(SaveResponse {
        success: true,
        saved_at: Utc::now().to_rfc3339(),
    }))
}

async fn get_content_handler(
    State(dir): State<Arc<ContentDir>>,
    Path((menu, submenu)): Path<(String, String)>,
) -> Result<Json<ContentRecord>, ApiError> {
    let page_id = PageId::from_parts(&menu, &submenu)?;
    match dir.load(&page_id).await? {
        Some(record) => Ok(Json(record)),
        None => {
            debug!("No content for {}", page_id);
            Err(ApiError::NotFound(page_id.to_string()))
        }
    }
}

/// Build the HTTP API router over the given content directory.
pub fn build_router(dir: Arc<ContentDir>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/content/{menu}/{submenu}",
            get(get_content_handler).post(put_content_handler),
        )
        .with_state(dir)
}
