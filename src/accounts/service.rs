use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::password::PasswordHashing;
use crate::{
    error::ServiceError,
    sessions::{SessionCarrier, SessionContext},
    store::{CredentialStore, NewUser, StoreError, User},
};

pub const MISSING_CREDENTIALS: &str = "Username and password are required";
pub const USERNAME_TAKEN: &str = "Username already exists";

/// Signup payload after JSON decoding; every field may still be missing.
#[derive(Debug, Default, Clone)]
pub struct SignupInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

/// A user together with the raw token of the session just opened for them.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub token: String,
}

/// Signup, login, logout and session checks.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    sessions: SessionCarrier,
    hashing: PasswordHashing,
}

impl AuthService {
    #[must_use]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        sessions: SessionCarrier,
        hashing: PasswordHashing,
    ) -> Self {
        Self {
            store,
            sessions,
            hashing,
        }
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionCarrier {
        &self.sessions
    }

    /// Create an account and open a session for it.
    ///
    /// # Errors
    /// `Validation` when username or password is missing, `Conflict` when the
    /// username is taken, `Store`/`Internal` for persistence or hashing failures.
    pub async fn signup(&self, input: SignupInput) -> Result<Authenticated, ServiceError> {
        let username = input
            .username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        let password = input.password.filter(|p| !p.is_empty());
        let (Some(username), Some(password)) = (username, password) else {
            return Err(ServiceError::validation(MISSING_CREDENTIALS));
        };

        let password_hash = self.hashing.hash(password).await?;

        let user = match self
            .store
            .create_user(NewUser {
                username,
                password_hash,
                image_url: non_blank(input.image_url),
                bio: non_blank(input.bio),
            })
            .await
        {
            Ok(user) => user,
            Err(StoreError::Duplicate) => {
                debug!("signup rejected: username taken");
                return Err(ServiceError::Conflict(USERNAME_TAKEN.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        // The account only exists if its first session does.
        let token = match self.sessions.create(user.id).await {
            Ok(token) => token,
            Err(err) => {
                if let Err(cleanup) = self.store.delete_user(user.id).await {
                    error!(
                        user_id = user.id,
                        "failed to remove user after session error: {cleanup}"
                    );
                }
                return Err(err);
            }
        };
        info!(user_id = user.id, "user signed up");

        Ok(Authenticated { user, token })
    }

    /// Verify credentials and open a session.
    ///
    /// # Errors
    /// `Auth` for an unknown username or a wrong password, without saying which.
    pub async fn login(
        &self,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Authenticated, ServiceError> {
        let (Some(username), Some(password)) = (username, password) else {
            return Err(ServiceError::Auth);
        };

        let user = self.store.user_by_username(username.trim()).await?;
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());

        let verified = self.hashing.verify(password, stored_hash).await?;
        let Some(user) = user.filter(|_| verified) else {
            warn!("login rejected");
            return Err(ServiceError::Auth);
        };

        let token = self.sessions.create(user.id).await?;
        info!(user_id = user.id, "user logged in");

        Ok(Authenticated { user, token })
    }

    /// Destroy the session behind `session`.
    ///
    /// # Errors
    /// `Auth` when there is no active session.
    pub async fn logout(&self, session: &SessionContext) -> Result<(), ServiceError> {
        self.sessions.destroy(session).await?;
        info!(user_id = session.user_id(), "user logged out");
        Ok(())
    }

    /// Load the user behind `session` without mutating anything.
    ///
    /// # Errors
    /// `Auth` when there is no active session or its user no longer exists.
    pub async fn check_session(&self, session: &SessionContext) -> Result<User, ServiceError> {
        let user_id = session.require_user()?;
        self.store
            .user_by_id(user_id)
            .await?
            .ok_or(ServiceError::Auth)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
