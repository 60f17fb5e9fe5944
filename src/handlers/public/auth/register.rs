// handlers/public/auth/register.rs - POST /api/v1/register handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::app::AppState;
use crate::database::models::User;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Registration;

/// POST /api/v1/register - Create a new account
///
/// Input: `{"name", "email", "password"}`. Returns 201 with the stored user
/// (never the password hash), 400 on validation failures and 409 when the
/// email is already registered.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> ApiResult<User> {
    let registration = json_body(payload, "Please provide a valid user.")?;
    let user = state.users.register(registration).await?;
    Ok(ApiResponse::created(user))
}
