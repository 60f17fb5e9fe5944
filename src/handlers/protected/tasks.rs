use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::app::AppState;
use crate::database::models::Task;
use crate::handlers::{json_body, path_id};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, Message};
use crate::services::{NewTaskInput, TaskEdit};

const INVALID_TASK: &str = "Please provide a valid task.";

/// GET /api/v1/tasks/list/:listId - Tasks of a list, newest first
pub async fn tasks_by_list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    list_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<Task>> {
    let list_id = path_id(list_id)?;
    let tasks = state.tasks.tasks_in_list(&user, list_id).await?;
    Ok(ApiResponse::ok(tasks))
}

/// GET /api/v1/tasks/:url - A single task by its slug
pub async fn task_get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(url): Path<String>,
) -> ApiResult<Task> {
    let task = state.tasks.get_by_url(&user, &url).await?;
    Ok(ApiResponse::ok(task))
}

/// POST /api/v1/tasks - Create a task in one of the caller's lists
pub async fn task_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<NewTaskInput>, JsonRejection>,
) -> ApiResult<Task> {
    let input = json_body(payload, INVALID_TASK)?;
    let task = state.tasks.create(&user, input).await?;
    Ok(ApiResponse::created(task))
}

/// PATCH /api/v1/tasks/:id - Toggle completion
pub async fn task_patch(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Task> {
    let id = path_id(id)?;
    let task = state.tasks.toggle(&user, id).await?;
    Ok(ApiResponse::accepted(task))
}

/// PUT /api/v1/tasks/:id - Edit title and description
pub async fn task_put(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskEdit>, JsonRejection>,
) -> ApiResult<Task> {
    let id = path_id(id)?;
    let edit = json_body(payload, INVALID_TASK)?;
    let task = state.tasks.update(&user, id, edit).await?;
    Ok(ApiResponse::accepted(task))
}

/// DELETE /api/v1/tasks/:id
pub async fn task_delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Message> {
    let id = path_id(id)?;
    state.tasks.delete(&user, id).await?;
    Ok(ApiResponse::accepted(Message::new("Task deleted successfully.")))
}
