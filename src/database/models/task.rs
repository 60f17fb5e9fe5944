use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub list_id: i64,
    pub created_by_id: i64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub list_id: i64,
    pub created_by_id: i64,
    pub title: String,
    pub url: String,
    pub description: String,
}
