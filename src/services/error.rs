use thiserror::Error;

use crate::auth::PasswordError;
use crate::database::DatabaseError;

/// Outcome kinds shared by every service operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation(constraint) => {
                tracing::debug!("Unique violation on {}", constraint);
                ServiceError::Conflict("This resource already exists.".to_string())
            }
            DatabaseError::ForeignKeyViolation(constraint) => {
                tracing::debug!("Foreign key violation on {}", constraint);
                ServiceError::NotFound("A referenced resource does not exist.".to_string())
            }
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Internal(format!("background task failed: {}", err))
    }
}

/// Rejects values whose character count falls outside `[min, max]`.
pub(crate) fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ServiceError> {
    let len = value.chars().count();
    if len < min {
        return Err(ServiceError::invalid(format!(
            "The {} has to be at least {} characters long.",
            field, min
        )));
    }
    if len > max {
        return Err(ServiceError::invalid(format!(
            "The {} can be maximum {} characters long.",
            field, max
        )));
    }
    Ok(())
}
