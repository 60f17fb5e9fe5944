use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

const FILE_FIELD: &str = "file";
const MISSING: &str = "Please provide a file!";
const TOO_LARGE: &str = "The file is too large.";

#[derive(Debug, Serialize)]
pub struct Uploaded {
    pub filepath: String,
}

/// POST /api/v1/files - Upload an image (multipart field `file`)
///
/// Returns 201 `{"filepath": "/assets/images/<name>"}`.
pub async fn file_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Uploaded> {
    let missing = || ApiError::bad_request(MISSING);
    let mut multipart = multipart.map_err(|_| missing())?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!("Unreadable multipart body: {}", e);
        unreadable(e)
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            tracing::debug!("Unreadable upload: {}", e);
            unreadable(e)
        })?;

        let filepath = state.uploads.store(file_name.as_deref(), &bytes).await?;
        tracing::info!("User {} uploaded {}", user.id, filepath);
        return Ok(ApiResponse::created(Uploaded { filepath }));
    }

    Err(missing())
}

/// Bodies cut off by the upload size limit are 413; anything else unreadable
/// counts as no file.
fn unreadable(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(TOO_LARGE)
    } else {
        ApiError::bad_request(MISSING)
    }
}
