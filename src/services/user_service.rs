use std::sync::Arc;

use serde::Deserialize;

use crate::auth::{PasswordHashing, TokenIssuer};
use crate::database::{
    models::{NewUser, User},
    Store, UserStore,
};
use crate::services::error::{check_length, ServiceError};

/// Registration payload as sent by clients.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Registration, login and account activation.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    passwords: PasswordHashing,
    tokens: TokenIssuer,
    require_activation: bool,
}

impl UserService {
    pub fn new(
        store: Arc<dyn Store>,
        passwords: PasswordHashing,
        tokens: TokenIssuer,
        require_activation: bool,
    ) -> Self {
        Self {
            store,
            passwords,
            tokens,
            require_activation,
        }
    }

    pub async fn register(&self, registration: Registration) -> Result<User, ServiceError> {
        let email = normalize_email(&registration.email);

        check_length("name", &registration.name, 6, 64)?;
        if !is_valid_email(&email) {
            return Err(ServiceError::invalid("Please provide a valid email address."));
        }
        if registration.password.is_empty() {
            return Err(ServiceError::invalid("Please provide a password."));
        }

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("User with this email already exists.".to_string()));
        }

        let passwords = self.passwords.clone();
        let plaintext = registration.password;
        let hash = tokio::task::spawn_blocking(move || passwords.hash(&plaintext)).await??;

        let user = self
            .store
            .insert_user(NewUser {
                name: registration.name,
                email,
                password: hash,
                is_enabled: !self.require_activation,
            })
            .await
            .map_err(|e| match ServiceError::from(e) {
                // Lost a race with a concurrent registration of the same email
                ServiceError::Conflict(_) => {
                    ServiceError::Conflict("User with this email already exists.".to_string())
                }
                other => other,
            })?;

        tracing::info!("Registered user {} (enabled: {})", user.id, user.is_enabled);
        Ok(user)
    }

    /// Checks credentials and returns a freshly issued session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        let user = self
            .store
            .find_user_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| ServiceError::not_found("User with this email does not exist."))?;

        if !user.is_enabled {
            return Err(ServiceError::Forbidden("This user is not activated.".to_string()));
        }

        let passwords = self.passwords.clone();
        let plaintext = password.to_string();
        let stored = user.password.clone();
        let verified = tokio::task::spawn_blocking(move || passwords.verify(&plaintext, &stored)).await??;
        if !verified {
            tracing::warn!("Failed login for user {}", user.id);
            return Err(ServiceError::Forbidden("Incorrect password.".to_string()));
        }

        let token = self
            .tokens
            .issue(user.id)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        tracing::info!("User {} logged in", user.id);
        Ok(token)
    }

    /// Operator action: enable or disable the account registered under `email`.
    pub async fn set_enabled(&self, email: &str, enabled: bool) -> Result<User, ServiceError> {
        let user = self
            .store
            .find_user_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| ServiceError::not_found("User with this email does not exist."))?;

        let updated = self
            .store
            .set_user_enabled(user.id, enabled)
            .await?
            .ok_or_else(|| ServiceError::not_found("User with this email does not exist."))?;

        tracing::info!("User {} enabled set to {}", updated.id, updated.is_enabled);
        Ok(updated)
    }
}

/// Emails are stored and looked up trimmed and lowercased.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Simple `local@domain.tld` shape check.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .map(|(host, _)| !host.is_empty() && !domain.ends_with('.'))
            .unwrap_or(false)
}
