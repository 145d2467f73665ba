//! Route handlers and error-to-response translation.
//!
//! # Responsibilities
//! - Map multipart fields onto the upload pipeline
//! - Translate pipeline errors into JSON error responses
//! - Health probe

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::http::server::AppState;
use crate::uploads::types::{Category, DeleteError, UploadError};

/// One stored file as reported to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: Uuid,
    pub file_name: String,
    pub url: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub files: Vec<StoredFile>,
}

/// Errors surfaced by the route layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Delete(#[from] DeleteError),

    #[error("malformed multipart request: {0}")]
    Multipart(#[from] MultipartError),

    #[error("request contained no file fields")]
    NoFilesProvided,

    #[error("unknown upload category {0:?}")]
    UnknownCategory(String),

    #[error("asset name {0:?} is not of the form {{uuid}}{{extension}}")]
    InvalidAssetName(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Upload(UploadError::UnsupportedType { .. }) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_type")
            }
            ApiError::Upload(UploadError::TooLarge { .. }) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "too_large")
            }
            ApiError::Upload(UploadError::TooManyFiles { .. }) => {
                (StatusCode::BAD_REQUEST, "too_many_files")
            }
            // Client input was fine; the environment failed us. Log it.
            ApiError::Upload(UploadError::Storage(e)) => {
                tracing::error!(error = %e, "Upload storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_failure")
            }
            ApiError::Delete(DeleteError::Storage(e)) => {
                tracing::error!(error = %e, "Delete storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_failure")
            }
            ApiError::Multipart(_) => (StatusCode::BAD_REQUEST, "malformed_multipart"),
            ApiError::NoFilesProvided => (StatusCode::BAD_REQUEST, "no_files"),
            ApiError::UnknownCategory(_) => (StatusCode::BAD_REQUEST, "unknown_category"),
            ApiError::InvalidAssetName(_) => (StatusCode::BAD_REQUEST, "invalid_asset_name"),
        };

        let body = Json(json!({
            "error": code,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

pub async fn upload_blog_images(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    store_files(&state, Category::BlogImages, multipart).await
}

pub async fn upload_testimonial_images(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    store_files(&state, Category::TestimonialImages, multipart).await
}

/// Run every file field of the request through one acceptance batch.
async fn store_files(
    state: &AppState,
    category: Category,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut batch = state.pipeline.batch(category);
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        // Non-file fields (captions, form metadata) are not ours to judge.
        let Some(original) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await?;

        let asset = batch.accept(&original, &mime, &data)?;
        files.push(StoredFile {
            id: asset.id,
            file_name: asset.file_name(),
            url: state.pipeline.url_for(asset.category, asset.id, &asset.extension),
            size_bytes: asset.size_bytes,
            mime_type: asset.mime_type,
        });
    }

    if files.is_empty() {
        return Err(ApiError::NoFilesProvided);
    }

    tracing::info!(category = %category, count = files.len(), "Upload request stored");
    Ok(Json(UploadResponse { files }))
}

pub async fn delete_upload(
    State(state): State<AppState>,
    Path((directory, file)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let category = state
        .pipeline
        .category_for_directory(&directory)
        .ok_or(ApiError::UnknownCategory(directory))?;

    let (id, extension) =
        parse_asset_name(&file).ok_or_else(|| ApiError::InvalidAssetName(file.clone()))?;

    state.pipeline.delete(category, id, &extension)?;
    Ok(Json(json!({ "deleted": true })))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Split `{uuid}{extension}` back into its parts.
fn parse_asset_name(file: &str) -> Option<(Uuid, String)> {
    let (stem, extension) = match file.find('.') {
        Some(idx) => (&file[..idx], file[idx..].to_string()),
        None => (file, String::new()),
    };
    let id = stem.parse::<Uuid>().ok()?;
    Some((id, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_asset_name() {
        let id = Uuid::new_v4();

        let (parsed, ext) = parse_asset_name(&format!("{}.png", id)).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(ext, ".png");

        // Extensionless names are legal: extension was empty at accept time.
        let (parsed, ext) = parse_asset_name(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(ext, "");

        // Multi-dot extensions split at the first dot, matching file_name().
        let (_, ext) = parse_asset_name(&format!("{}.tar.gz", id)).unwrap();
        assert_eq!(ext, ".tar.gz");

        assert!(parse_asset_name("not-a-uuid.png").is_none());
        assert!(parse_asset_name("").is_none());
    }
}
