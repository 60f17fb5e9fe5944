use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::app::AppState;
use crate::database::models::List;
use crate::handlers::{json_body, path_id};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, Message};
use crate::services::ListInput;

const INVALID_LIST: &str = "Please provide a valid list.";

/// GET /api/v1/lists/user/:userId - All lists of a user (self only)
pub async fn lists_by_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    owner_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<List>> {
    let owner_id = path_id(owner_id)?;
    let lists = state.lists.lists_for_user(&user, owner_id).await?;
    Ok(ApiResponse::ok(lists))
}

/// GET /api/v1/lists/:url - A single list by its slug
pub async fn list_get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(url): Path<String>,
) -> ApiResult<List> {
    let list = state.lists.get_by_url(&user, &url).await?;
    Ok(ApiResponse::ok(list))
}

/// POST /api/v1/lists - Create a list owned by the caller
pub async fn list_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<ListInput>, JsonRejection>,
) -> ApiResult<List> {
    let input = json_body(payload, INVALID_LIST)?;
    let list = state.lists.create(&user, input).await?;
    Ok(ApiResponse::created(list))
}

/// PUT /api/v1/lists/:id - Rename a list or change its image
pub async fn list_put(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ListInput>, JsonRejection>,
) -> ApiResult<List> {
    let id = path_id(id)?;
    let input = json_body(payload, INVALID_LIST)?;
    let list = state.lists.update(&user, id, input).await?;
    Ok(ApiResponse::accepted(list))
}

/// DELETE /api/v1/lists/:id - Delete a list together with its tasks
pub async fn list_delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Message> {
    let id = path_id(id)?;
    state.lists.delete(&user, id).await?;
    Ok(ApiResponse::accepted(Message::new("List deleted successfully.")))
}
