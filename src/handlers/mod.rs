// handlers/mod.rs - HTTP handlers by security tier
//
// Public (no session) -> Protected (session cookie resolved to a CurrentUser)

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    Json,
};

use crate::error::ApiError;

pub mod protected; // Session required (/api/v1/user, /lists, /tasks, /files)
pub mod public; // No session (/api/v1/register, /login, /logout)

/// Unwrap a JSON body, answering 400 with `message` when it does not parse.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>, message: &str) -> Result<T, ApiError> {
    payload.map(|Json(value)| value).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        ApiError::bad_request(message)
    })
}

/// Numeric `:id` path segment.
pub(crate) fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::bad_request("Please specify a valid id."))
}
