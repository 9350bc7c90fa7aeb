//! Image upload and local media serving (/upload, /media/*)

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use super::auth::AuthUser;
use crate::AppState;
use crate::services::error::{ApiError, LogErr};
use crate::services::response::{Envelope, success};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(upload))
        .route("/media/{*path}", get(serve_media))
}

fn get_extension(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

/// Path: image/user_123/1733500000000.png
fn media_relative_path(user_id: i64, timestamp_millis: i64, ext: &str) -> String {
    format!("image/user_{}/{}.{}", user_id, timestamp_millis, ext)
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    url: String,
}

/// POST /upload - Store an uploaded image and return its served URL
async fn upload(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Envelope<UploadResponse>>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(ApiError::BadRequest(
                "only image uploads are supported".to_string(),
            ));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let ext = get_extension(&content_type);
        let rel_path = media_relative_path(user_id, Utc::now().timestamp_millis(), ext);
        let full_path = state.media_root.join(&rel_path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .log_500("Create media directory error")?;
        }
        tokio::fs::write(&full_path, &data)
            .await
            .log_500("Write media file error")?;

        let url = format!("/media/{}", rel_path);
        return Ok((StatusCode::CREATED, success(UploadResponse { url })));
    }

    Err(ApiError::BadRequest("missing image field".to_string()))
}

/// GET /media/*path - Serve an uploaded file from the media root
async fn serve_media(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Reject paths with traversal attempts or null bytes upfront
    if path.contains("..") || path.contains('\0') {
        return Err(ApiError::Forbidden);
    }

    let full_path = state.media_root.join(&path);

    // canonicalize() resolves symlinks, so a resolved path outside the media
    // root means the request is trying to escape it
    let canonical = full_path.canonicalize().map_err(|_| ApiError::NotFound)?;
    let media_canonical = state
        .media_root
        .canonicalize()
        .log_500("Failed to canonicalize media root")?;

    if !canonical.starts_with(&media_canonical) {
        return Err(ApiError::Forbidden);
    }

    let bytes = tokio::fs::read(&canonical)
        .await
        .map_err(|_| ApiError::NotFound)?;

    let content_type = match canonical.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    };

    // Files are immutable (path includes a timestamp), cache aggressively
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(get_extension("image/png"), "png");
        assert_eq!(get_extension("image/jpeg"), "jpg");
        assert_eq!(get_extension("image/jpg"), "jpg");
        assert_eq!(get_extension("image/webp"), "webp");
        assert_eq!(get_extension("image/gif"), "gif");
        assert_eq!(get_extension("application/pdf"), "bin");
    }

    #[test]
    fn test_media_path_shape() {
        assert_eq!(
            media_relative_path(7, 1733500000000, "png"),
            "image/user_7/1733500000000.png"
        );
    }
}
