use std::sync::Arc;

use serde::Deserialize;

use crate::auth::require_owner;
use crate::database::{
    models::{List, NewTask, Task, User},
    ListStore, Store, TaskStore,
};
use crate::services::error::{check_length, ServiceError};
use crate::slug;

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskInput {
    pub list_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `PUT /tasks/:id`. Completion only changes through the toggle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEdit {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

fn validate(title: &str, description: &str) -> Result<(), ServiceError> {
    check_length("title", title, 3, 32)?;
    check_length("description", description, 0, 256)
}

/// Task operations. Every task is governed by the owner of the list it lives in.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn tasks_in_list(&self, user: &User, list_id: i64) -> Result<Vec<Task>, ServiceError> {
        let list = self.find_list(list_id).await?;
        require_owner(user, list.owner_id, "You do not have the permission to view this list.")?;
        Ok(self.store.tasks_by_list(list_id).await?)
    }

    pub async fn get_by_url(&self, user: &User, url: &str) -> Result<Task, ServiceError> {
        let task = self
            .store
            .find_task_by_url(url)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task with this URL does not exist."))?;

        self.authorize(user, &task, "You do not have the permission to view this list.")
            .await?;
        Ok(task)
    }

    pub async fn create(&self, user: &User, input: NewTaskInput) -> Result<Task, ServiceError> {
        validate(&input.title, &input.description)?;

        let list = self.find_list(input.list_id).await?;
        require_owner(user, list.owner_id, "You do not have the permission to create in this list.")?;

        let task = self
            .store
            .insert_task(NewTask {
                list_id: list.id,
                created_by_id: user.id,
                url: slug::unique_slug(&input.title),
                title: input.title,
                description: input.description,
            })
            .await?;

        tracing::info!("User {} created task {} in list {}", user.id, task.id, list.id);
        Ok(task)
    }

    pub async fn update(&self, user: &User, id: i64, edit: TaskEdit) -> Result<Task, ServiceError> {
        let task = self.find_task(id).await?;
        self.authorize(user, &task, "You do not have permission to do this.").await?;
        validate(&edit.title, &edit.description)?;

        self.store
            .update_task(id, &edit.title, &edit.description)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task with this ID does not exist."))
    }

    /// Flips the completion flag; the store does it atomically.
    pub async fn toggle(&self, user: &User, id: i64) -> Result<Task, ServiceError> {
        let task = self.find_task(id).await?;
        self.authorize(user, &task, "You do not have permission to do this.").await?;

        self.store
            .toggle_task(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task with this ID does not exist."))
    }

    pub async fn delete(&self, user: &User, id: i64) -> Result<(), ServiceError> {
        let task = self.find_task(id).await?;
        self.authorize(user, &task, "You do not have permission to do this.").await?;

        if !self.store.delete_task(id).await? {
            return Err(ServiceError::not_found("Task with this ID does not exist."));
        }
        Ok(())
    }

    async fn authorize(&self, user: &User, task: &Task, message: &str) -> Result<(), ServiceError> {
        let list = self.find_list(task.list_id).await?;
        require_owner(user, list.owner_id, message)
    }

    async fn find_list(&self, id: i64) -> Result<List, ServiceError> {
        self.store
            .find_list_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("List with this ID does not exist."))
    }

    async fn find_task(&self, id: i64) -> Result<Task, ServiceError> {
        self.store
            .find_task_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task with this ID does not exist."))
    }
}
