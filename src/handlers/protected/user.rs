use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// GET /api/v1/user - The user behind the current session
pub async fn user_get(CurrentUser(user): CurrentUser) -> ApiResult<User> {
    Ok(ApiResponse::ok(user))
}
