use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{List, NewList, NewTask, NewUser, Task, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `UniqueViolation` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn set_user_enabled(&self, id: i64, enabled: bool) -> Result<Option<User>, DatabaseError>;
}

#[async_trait]
pub trait ListStore: Send + Sync {
    async fn insert_list(&self, list: NewList) -> Result<List, DatabaseError>;

    async fn find_list_by_id(&self, id: i64) -> Result<Option<List>, DatabaseError>;

    async fn find_list_by_url(&self, url: &str) -> Result<Option<List>, DatabaseError>;

    /// Lists owned by `owner_id`, newest first.
    async fn lists_by_owner(&self, owner_id: i64) -> Result<Vec<List>, DatabaseError>;

    /// Updates name and image; the url is never rewritten.
    async fn update_list(&self, id: i64, name: &str, image_id: i64) -> Result<Option<List>, DatabaseError>;

    /// Hard delete, cascading to the list's tasks. Returns whether a row went away.
    async fn delete_list(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: NewTask) -> Result<Task, DatabaseError>;

    async fn find_task_by_id(&self, id: i64) -> Result<Option<Task>, DatabaseError>;

    async fn find_task_by_url(&self, url: &str) -> Result<Option<Task>, DatabaseError>;

    /// Tasks in `list_id`, newest first.
    async fn tasks_by_list(&self, list_id: i64) -> Result<Vec<Task>, DatabaseError>;

    async fn update_task(&self, id: i64, title: &str, description: &str) -> Result<Option<Task>, DatabaseError>;

    /// Flips `is_done` in a single atomic step and returns the new row.
    async fn toggle_task(&self, id: i64) -> Result<Option<Task>, DatabaseError>;

    async fn delete_task(&self, id: i64) -> Result<bool, DatabaseError>;
}

/// Everything the services need from persistence.
#[async_trait]
pub trait Store: UserStore + ListStore + TaskStore {
    async fn health_check(&self) -> Result<(), DatabaseError>;
}
