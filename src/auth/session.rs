use std::sync::Arc;

use thiserror::Error;

use crate::auth::token::TokenIssuer;
use crate::database::{models::User, Store, UserStore};

/// The bearer value a request carried, wherever the transport found it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Option<String>);

impl Credential {
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|t| !t.trim().is_empty()))
    }

    pub fn missing() -> Self {
        Self(None)
    }

    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Credential(<redacted>)"),
            None => f.write_str("Credential(None)"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no valid credential")]
    NotAuthenticated,

    #[error("user {0} not found")]
    UserNotFound(i64),

    #[error("session lookup failed: {0}")]
    Internal(String),
}

/// Resolves a request credential to the user it identifies.
#[derive(Clone)]
pub struct SessionResolver {
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
}

impl SessionResolver {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    pub async fn resolve(&self, credential: &Credential) -> Result<User, SessionError> {
        let token = credential.token().ok_or(SessionError::NotAuthenticated)?;

        let user_id = self.tokens.verify(token).map_err(|e| {
            tracing::debug!("Rejected session token: {}", e);
            SessionError::NotAuthenticated
        })?;

        let user = self
            .store
            .find_user_by_id(user_id)
            .await
            .map_err(|e| SessionError::Internal(e.to_string()))?
            .ok_or(SessionError::UserNotFound(user_id))?;

        if !user.is_enabled {
            tracing::warn!("Session token presented for disabled user {}", user.id);
            return Err(SessionError::NotAuthenticated);
        }

        Ok(user)
    }
}
