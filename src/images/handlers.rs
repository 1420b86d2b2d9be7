use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use super::services::{store_upload, UploadItem};
use crate::{auth::extractors::CurrentUser, error::ApiError, state::AppState};

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_file))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub detail: String,
    pub file_url: String,
}

/// POST /upload (multipart, field `file`)
#[instrument(skip(state, user, mp), fields(user_id = user.id))]
pub async fn upload_file(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    while let Some(field) = mp.next_field().await.map_err(|e| {
        warn!(error = %e, "malformed multipart body");
        ApiError::BadRequest("Malformed multipart body".into())
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("file").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = field.bytes().await.map_err(|e| {
            warn!(error = %e, "failed to read upload");
            ApiError::BadRequest("Malformed multipart body".into())
        })?;

        let item = UploadItem {
            filename: &filename,
            content_type: &content_type,
            body,
        };
        let file_url = store_upload(state.storage.as_ref(), item, state.config.storage.url_ttl_secs)
            .await
            .map_err(|e| {
                error!(error = %format!("{e:#}"), "upload failed");
                ApiError::Internal("There was an error uploading the file".into())
            })?;

        info!(%filename, "file uploaded");
        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                detail: format!("Successfully uploaded file {filename}"),
                file_url,
            }),
        ));
    }

    Err(ApiError::BadRequest("file is required".into()))
}
