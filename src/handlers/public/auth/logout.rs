// handlers/public/auth/logout.rs - POST /api/v1/logout handler

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{expired_cookie, ApiResponse, Message};

/// POST /api/v1/logout - Expire the session cookie
///
/// Only the client copy goes away; tokens are not revoked server-side.
pub async fn logout_post(State(state): State<AppState>) -> Result<Response, ApiError> {
    let cookie = expired_cookie(&state.config.security)?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::ok(Message::new("Successful logout!")),
    )
        .into_response())
}
