//! CMS image upload.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State},
    response::{IntoResponse, Response},
};
use homestay_auth::require_moderator;
use tracing::info;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::media::UploadFile;
use crate::state::AppState;

/// `POST /api/upload`: forwards the `file` part to the image host.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth): CurrentUser,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    require_moderator(&auth.user)?;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        file = Some(UploadFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let file = file.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    let size = file.bytes.len();

    let uploaded = state
        .images
        .upload(file)
        .await
        .map_err(|e| ApiError::upstream("Upload failed", e))?;
    info!(file_id = %uploaded.file_id, size, "Image uploaded");

    Ok(Json(uploaded).into_response())
}
