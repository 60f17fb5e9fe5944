use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: i64,
    pub owner_id: i64,
    pub image_id: i64,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct NewList {
    pub owner_id: i64,
    pub image_id: i64,
    pub name: String,
    pub url: String,
}
