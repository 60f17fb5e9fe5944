// handlers/public/auth/login.rs - POST /api/v1/login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::middleware::{session_cookie, ApiResponse, Message};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/**
 * POST /api/v1/login - Authenticate and receive a session cookie
 *
 * Input: `{"email": "...", "password": "..."}`
 *
 * On success the signed token travels in an HttpOnly cookie and the body is
 * `{"message": "Successful login!"}`.
 *
 * Errors:
 * - 400 body is not a valid user
 * - 404 no user with this email
 * - 403 user not activated, or wrong password
 */
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(payload, "Please provide a valid user.")?;

    let token = state.users.login(&request.email, &request.password).await?;
    let cookie = session_cookie(&state.config.security, &token)?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::ok(Message::new("Successful login!")),
    )
        .into_response())
}
