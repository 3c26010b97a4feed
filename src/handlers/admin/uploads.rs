use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};
use bytes::Bytes;
use serde_json::{json, Value};

use crate::error::{self, ApiError};
use crate::state::AppState;
use crate::upload::UploadError;

/// POST /api/admin/uploads
///
/// Raw body upload: the filename and content type arrive as headers, not
/// multipart. Backend diagnostics are attached only under the explicit
/// debug opt-in, truncated and with credentials masked.
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let filename = headers
        .get("x-filename")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("upload.bin");
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    match state.uploads.store(filename, content_type, body).await {
        Ok(public_url) => Ok(Json(json!({
            "success": true,
            "publicUrl": public_url,
            "message": "Upload complete",
        }))),
        Err(UploadError::TooLarge { limit, .. }) => Err(ApiError::UploadTooLarge { limit }),
        Err(err) => {
            tracing::error!("upload failed: {}", err);
            let diagnostic = if error::debug_requested(&headers, &state.config) {
                Some(error::truncate_diagnostic(&detail_of(&err)))
            } else {
                None
            };
            Err(ApiError::UploadFailed {
                message: "Upload failed on all configured backends".to_string(),
                diagnostic,
            })
        }
    }
}

fn detail_of(err: &UploadError) -> String {
    match err {
        UploadError::AllBackendsFailed { primary, fallback } => format!(
            "primary: {}\nfallback: {}",
            primary.as_deref().unwrap_or("not configured"),
            fallback
        ),
        other => other.to_string(),
    }
}
