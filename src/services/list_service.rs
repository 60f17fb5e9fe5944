use std::sync::Arc;

use serde::Deserialize;

use crate::auth::require_owner;
use crate::database::{
    models::{List, NewList, User},
    ListStore, Store,
};
use crate::services::error::{check_length, ServiceError};
use crate::slug;

const DEFAULT_IMAGE_ID: i64 = 1;

/// Client-editable list fields. Anything else in the body (owner, url) is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInput {
    pub name: String,
    #[serde(default)]
    pub image_id: Option<i64>,
}

impl ListInput {
    fn validate(&self) -> Result<(), ServiceError> {
        check_length("name", &self.name, 3, 32)
    }
}

#[derive(Clone)]
pub struct ListService {
    store: Arc<dyn Store>,
}

impl ListService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All lists of `owner_id`; only that user may ask.
    pub async fn lists_for_user(&self, user: &User, owner_id: i64) -> Result<Vec<List>, ServiceError> {
        require_owner(user, owner_id, "You do not have permission to view this list.")?;
        Ok(self.store.lists_by_owner(owner_id).await?)
    }

    pub async fn get_by_url(&self, user: &User, url: &str) -> Result<List, ServiceError> {
        let list = self
            .store
            .find_list_by_url(url)
            .await?
            .ok_or_else(|| ServiceError::not_found("List with this URL does not exist."))?;

        require_owner(user, list.owner_id, "You do not have permission to view this list.")?;
        Ok(list)
    }

    /// Creates a list owned by `user`, whatever the client claimed.
    pub async fn create(&self, user: &User, input: ListInput) -> Result<List, ServiceError> {
        input.validate()?;

        let list = self
            .store
            .insert_list(NewList {
                owner_id: user.id,
                image_id: input.image_id.unwrap_or(DEFAULT_IMAGE_ID),
                url: slug::unique_slug(&input.name),
                name: input.name,
            })
            .await?;

        tracing::info!("User {} created list {} ({})", user.id, list.id, list.url);
        Ok(list)
    }

    pub async fn update(&self, user: &User, id: i64, input: ListInput) -> Result<List, ServiceError> {
        let existing = self.find_by_id(id).await?;
        require_owner(user, existing.owner_id, "You do not have permission to edit this list.")?;
        input.validate()?;

        let image_id = input.image_id.unwrap_or(existing.image_id);
        self.store
            .update_list(id, &input.name, image_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("List with this ID does not exist."))
    }

    /// Deletes the list and, through the store, every task in it.
    pub async fn delete(&self, user: &User, id: i64) -> Result<(), ServiceError> {
        let existing = self.find_by_id(id).await?;
        require_owner(user, existing.owner_id, "You do not have permission to delete this list.")?;

        if !self.store.delete_list(id).await? {
            return Err(ServiceError::not_found("List with this ID does not exist."));
        }

        tracing::info!("User {} deleted list {}", user.id, id);
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<List, ServiceError> {
        self.store
            .find_list_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("List with this ID does not exist."))
    }
}
