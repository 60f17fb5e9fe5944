use crate::database::models::User;
use crate::services::ServiceError;

/// Ownership check: the resolved user must be the resource owner.
pub fn authorize(user: &User, owner_id: i64) -> bool {
    user.id == owner_id
}

/// Like [`authorize`], but fails with `Forbidden` carrying `message`.
pub fn require_owner(user: &User, owner_id: i64, message: &str) -> Result<(), ServiceError> {
    if authorize(user, owner_id) {
        Ok(())
    } else {
        tracing::warn!("User {} denied access to a resource owned by {}", user.id, owner_id);
        Err(ServiceError::Forbidden(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> User {
        User {
            id,
            name: "Test User".to_string(),
            email: format!("user{}@example.com", id),
            password: String::new(),
            is_enabled: true,
        }
    }

    #[test]
    fn owner_is_authorized_and_others_are_not() {
        let owner = user(1);
        assert!(authorize(&owner, 1));
        for other in [0, 2, 100, -1] {
            assert!(!authorize(&owner, other));
        }
    }

    #[test]
    fn require_owner_reports_forbidden() {
        let err = require_owner(&user(2), 1, "You do not have permission to view this list.").unwrap_err();
        assert_eq!(
            err,
            ServiceError::Forbidden("You do not have permission to view this list.".to_string())
        );
        assert!(require_owner(&user(1), 1, "unused").is_ok());
    }
}
