use async_trait::async_trait;
use sqlx::PgPool;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{List, NewList, NewTask, NewUser, Task, User};
use super::store::{ListStore, Store, TaskStore, UserStore};

const USER_COLUMNS: &str = "id, name, email, password, is_enabled";
const LIST_COLUMNS: &str = "id, owner_id, image_id, name, url";
const TASK_COLUMNS: &str = "id, list_id, created_by_id, title, url, description, is_done, created_at";

/// Store backed by a shared Postgres pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (name, email, password, is_enabled) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.is_enabled)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE lower(email) = lower($1)", USER_COLUMNS);
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn set_user_enabled(&self, id: i64, enabled: bool) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "UPDATE users SET is_enabled = $2 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(enabled)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl ListStore for PgStore {
    async fn insert_list(&self, list: NewList) -> Result<List, DatabaseError> {
        let sql = format!(
            "INSERT INTO lists (owner_id, image_id, name, url) VALUES ($1, $2, $3, $4) RETURNING {}",
            LIST_COLUMNS
        );
        let row = sqlx::query_as::<_, List>(&sql)
            .bind(list.owner_id)
            .bind(list.image_id)
            .bind(&list.name)
            .bind(&list.url)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_list_by_id(&self, id: i64) -> Result<Option<List>, DatabaseError> {
        let sql = format!("SELECT {} FROM lists WHERE id = $1", LIST_COLUMNS);
        let row = sqlx::query_as::<_, List>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_list_by_url(&self, url: &str) -> Result<Option<List>, DatabaseError> {
        let sql = format!("SELECT {} FROM lists WHERE url = $1", LIST_COLUMNS);
        let row = sqlx::query_as::<_, List>(&sql)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn lists_by_owner(&self, owner_id: i64) -> Result<Vec<List>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM lists WHERE owner_id = $1 ORDER BY id DESC",
            LIST_COLUMNS
        );
        let rows = sqlx::query_as::<_, List>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update_list(&self, id: i64, name: &str, image_id: i64) -> Result<Option<List>, DatabaseError> {
        let sql = format!(
            "UPDATE lists SET name = $2, image_id = $3 WHERE id = $1 RETURNING {}",
            LIST_COLUMNS
        );
        let row = sqlx::query_as::<_, List>(&sql)
            .bind(id)
            .bind(name)
            .bind(image_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_list(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: NewTask) -> Result<Task, DatabaseError> {
        let sql = format!(
            "INSERT INTO tasks (list_id, created_by_id, title, url, description) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(task.list_id)
            .bind(task.created_by_id)
            .bind(&task.title)
            .bind(&task.url)
            .bind(&task.description)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_task_by_id(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_task_by_url(&self, url: &str) -> Result<Option<Task>, DatabaseError> {
        let sql = format!("SELECT {} FROM tasks WHERE url = $1", TASK_COLUMNS);
        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn tasks_by_list(&self, list_id: i64) -> Result<Vec<Task>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE list_id = $1 ORDER BY created_at DESC, id DESC",
            TASK_COLUMNS
        );
        let rows = sqlx::query_as::<_, Task>(&sql)
            .bind(list_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update_task(&self, id: i64, title: &str, description: &str) -> Result<Option<Task>, DatabaseError> {
        let sql = format!(
            "UPDATE tasks SET title = $2, description = $3 WHERE id = $1 RETURNING {}",
            TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(title)
            .bind(description)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn toggle_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        // Single statement: concurrent toggles serialize on the row lock
        let sql = format!(
            "UPDATE tasks SET is_done = NOT is_done WHERE id = $1 RETURNING {}",
            TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_task(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
