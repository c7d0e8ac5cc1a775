use crate::store::StoreError;

/// Failure of an auth or recipe operation.
///
/// The HTTP layer maps `Auth` to 401 and every other variant to 422.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),
    /// A uniqueness rule rejected the write.
    #[error("{0}")]
    Conflict(String),
    /// Missing or invalid session or credentials. The message never says which.
    #[error("Unauthorized")]
    Auth,
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Failures outside the store, such as hashing or token generation.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// `true` for failures the client did not cause.
    #[must_use]
    pub fn is_server_fault(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_message_is_generic() {
        assert_eq!(ServiceError::Auth.to_string(), "Unauthorized");
    }

    #[test]
    fn store_errors_are_server_faults() {
        assert!(ServiceError::Store(StoreError::Duplicate).is_server_fault());
        assert!(ServiceError::Internal("boom".to_string()).is_server_fault());
        assert!(!ServiceError::validation("Title is required").is_server_fault());
        assert!(!ServiceError::Auth.is_server_fault());
    }
}
