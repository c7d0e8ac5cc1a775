//! Server-side sessions addressed by an opaque token.
//!
//! The raw token only ever travels to the client (cookie or bearer header).
//! The store keeps its SHA-256 hash, so a leaked table cannot be replayed.

mod token;

pub use token::{generate_session_token, hash_session_token};

use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    error::ServiceError,
    store::{SessionStore, StoreError},
};

pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

/// 400 days, the longest cookie `Max-Age` browsers honour.
pub const MAX_SESSION_TTL_SECONDS: i64 = 400 * 24 * 60 * 60;

const INSERT_ATTEMPTS: usize = 3;

/// The session state of one request, resolved before any handler logic runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionContext {
    token: Option<String>,
    user_id: Option<i64>,
}

impl SessionContext {
    /// A request without a usable session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.user_id.is_some()
    }

    /// The authenticated user id, or [`ServiceError::Auth`].
    ///
    /// # Errors
    /// Returns `ServiceError::Auth` when no active session is attached.
    pub fn require_user(&self) -> Result<i64, ServiceError> {
        self.user_id.ok_or(ServiceError::Auth)
    }
}

/// Creates, resolves and destroys sessions. The only writer of session state.
#[derive(Clone)]
pub struct SessionCarrier {
    store: Arc<dyn SessionStore>,
    ttl_seconds: i64,
}

impl SessionCarrier {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, ttl_seconds: i64) -> Self {
        Self { store, ttl_seconds }
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Start a session for `user_id` and return the raw token for the client.
    ///
    /// # Errors
    /// Returns an error if token generation or the insert fails.
    pub async fn create(&self, user_id: i64) -> Result<String, ServiceError> {
        for _ in 0..INSERT_ATTEMPTS {
            let token = generate_session_token().map_err(|err| {
                ServiceError::Internal(format!("failed to generate session token: {err}"))
            })?;
            let token_hash = hash_session_token(&token);
            match self
                .store
                .insert_session(&token_hash, user_id, self.ttl_seconds)
                .await
            {
                Ok(()) => {
                    debug!(user_id, "session created");
                    return Ok(token);
                }
                Err(StoreError::Duplicate) => {
                    warn!("session token collision, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(ServiceError::Internal(
            "failed to allocate a unique session token".to_string(),
        ))
    }

    /// Resolve the presented token. Unknown or expired tokens yield an inactive context.
    ///
    /// # Errors
    /// Returns an error only if the store lookup fails.
    pub async fn resolve(&self, token: Option<String>) -> Result<SessionContext, ServiceError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(SessionContext::anonymous());
        };
        let user_id = self.store.lookup_session(&hash_session_token(&token)).await?;
        Ok(SessionContext {
            token: Some(token),
            user_id,
        })
    }

    /// Destroy the session behind `context`.
    ///
    /// # Errors
    /// Returns `ServiceError::Auth` if the context has no active session.
    pub async fn destroy(&self, context: &SessionContext) -> Result<(), ServiceError> {
        let (Some(token), Some(user_id)) = (context.token.as_deref(), context.user_id) else {
            return Err(ServiceError::Auth);
        };
        self.store.delete_session(&hash_session_token(token)).await?;
        debug!(user_id, "session destroyed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CredentialStore, MemoryStore, NewUser};
    use anyhow::Result;

    async fn carrier_with_user() -> Result<(SessionCarrier, i64)> {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_user(NewUser {
                username: "chef1".to_string(),
                password_hash: "hash".to_string(),
                image_url: None,
                bio: None,
            })
            .await?;
        Ok((SessionCarrier::new(store, 60), user.id))
    }

    #[tokio::test]
    async fn create_then_resolve_returns_user() -> Result<()> {
        let (carrier, user_id) = carrier_with_user().await?;
        let token = carrier.create(user_id).await?;
        let context = carrier.resolve(Some(token)).await?;
        assert_eq!(context.user_id(), Some(user_id));
        assert_eq!(context.require_user()?, user_id);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_or_missing_token_is_anonymous() -> Result<()> {
        let (carrier, _) = carrier_with_user().await?;
        assert!(!carrier.resolve(None).await?.is_active());
        assert!(!carrier.resolve(Some(String::new())).await?.is_active());
        assert!(!carrier.resolve(Some("forged".to_string())).await?.is_active());
        Ok(())
    }

    #[tokio::test]
    async fn destroy_invalidates_token() -> Result<()> {
        let (carrier, user_id) = carrier_with_user().await?;
        let token = carrier.create(user_id).await?;
        let context = carrier.resolve(Some(token.clone())).await?;
        carrier.destroy(&context).await?;
        assert!(!carrier.resolve(Some(token)).await?.is_active());
        Ok(())
    }

    #[tokio::test]
    async fn destroy_without_session_is_unauthorized() -> Result<()> {
        let (carrier, _) = carrier_with_user().await?;
        let result = carrier.destroy(&SessionContext::anonymous()).await;
        assert!(matches!(result, Err(ServiceError::Auth)));
        Ok(())
    }
}
