use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{List, NewList, NewTask, NewUser, Task, User};
use super::store::{ListStore, Store, TaskStore, UserStore};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    lists: BTreeMap<i64, List>,
    tasks: BTreeMap<i64, Task>,
    next_user_id: i64,
    next_list_id: i64,
    next_task_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Process-local store with the same constraints as the Postgres schema.
/// Used by `serve --in-memory` and the test suite.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Case-insensitive, like the `lower(email)` index in Postgres.
fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| same_email(&u.email, &user.email)) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }

        let id = next_id(&mut tables.next_user_id);
        let row = User {
            id,
            name: user.name,
            email: user.email,
            password: user.password,
            is_enabled: user.is_enabled,
        };
        tables.users.insert(id, row.clone());
        Ok(row)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| same_email(&u.email, email)).cloned())
    }

    async fn set_user_enabled(&self, id: i64, enabled: bool) -> Result<Option<User>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.is_enabled = enabled;
            user.clone()
        }))
    }
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn insert_list(&self, list: NewList) -> Result<List, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&list.owner_id) {
            return Err(DatabaseError::ForeignKeyViolation("lists_owner_id_fkey".to_string()));
        }
        if tables.lists.values().any(|l| l.url == list.url) {
            return Err(DatabaseError::UniqueViolation("lists_url_key".to_string()));
        }

        let id = next_id(&mut tables.next_list_id);
        let row = List {
            id,
            owner_id: list.owner_id,
            image_id: list.image_id,
            name: list.name,
            url: list.url,
        };
        tables.lists.insert(id, row.clone());
        Ok(row)
    }

    async fn find_list_by_id(&self, id: i64) -> Result<Option<List>, DatabaseError> {
        Ok(self.tables.read().await.lists.get(&id).cloned())
    }

    async fn find_list_by_url(&self, url: &str) -> Result<Option<List>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.lists.values().find(|l| l.url == url).cloned())
    }

    async fn lists_by_owner(&self, owner_id: i64) -> Result<Vec<List>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .lists
            .values()
            .rev()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_list(&self, id: i64, name: &str, image_id: i64) -> Result<Option<List>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.lists.get_mut(&id).map(|list| {
            list.name = name.to_string();
            list.image_id = image_id;
            list.clone()
        }))
    }

    async fn delete_list(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let removed = tables.lists.remove(&id).is_some();
        if removed {
            tables.tasks.retain(|_, task| task.list_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: NewTask) -> Result<Task, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.lists.contains_key(&task.list_id) {
            return Err(DatabaseError::ForeignKeyViolation("tasks_list_id_fkey".to_string()));
        }
        if tables.tasks.values().any(|t| t.url == task.url) {
            return Err(DatabaseError::UniqueViolation("tasks_url_key".to_string()));
        }

        let id = next_id(&mut tables.next_task_id);
        let row = Task {
            id,
            list_id: task.list_id,
            created_by_id: task.created_by_id,
            title: task.title,
            url: task.url,
            description: task.description,
            is_done: false,
            created_at: Utc::now(),
        };
        tables.tasks.insert(id, row.clone());
        Ok(row)
    }

    async fn find_task_by_id(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn find_task_by_url(&self, url: &str) -> Result<Option<Task>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.values().find(|t| t.url == url).cloned())
    }

    async fn tasks_by_list(&self, list_id: i64) -> Result<Vec<Task>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|t| t.list_id == list_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }

    async fn update_task(&self, id: i64, title: &str, description: &str) -> Result<Option<Task>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.tasks.get_mut(&id).map(|task| {
            task.title = title.to_string();
            task.description = description.to_string();
            task.clone()
        }))
    }

    async fn toggle_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.tasks.get_mut(&id).map(|task| {
            task.is_done = !task.is_done;
            task.clone()
        }))
    }

    async fn delete_task(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.tasks.remove(&id).is_some())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
