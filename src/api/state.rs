//! Shared request state and its configuration.

use std::sync::Arc;

use crate::{
    accounts::{AuthService, PasswordHashing},
    recipes::{RecipeRules, RecipeService, validation::DEFAULT_MIN_INSTRUCTIONS_LENGTH},
    sessions::{DEFAULT_SESSION_TTL_SECONDS, SessionCarrier},
    store::{CredentialStore, SessionStore},
};

#[derive(Clone, Debug)]
pub struct AppConfig {
    session_ttl_seconds: i64,
    session_cookie_secure: bool,
    min_instructions_length: usize,
    expose_store_errors: bool,
    cors_origin: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure: false,
            min_instructions_length: DEFAULT_MIN_INSTRUCTIONS_LENGTH,
            expose_store_errors: false,
            cors_origin: None,
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_min_instructions_length(mut self, length: usize) -> Self {
        self.min_instructions_length = length;
        self
    }

    #[must_use]
    pub fn with_expose_store_errors(mut self, expose: bool) -> Self {
        self.expose_store_errors = expose;
        self
    }

    #[must_use]
    pub fn with_cors_origin(mut self, origin: Option<String>) -> Self {
        self.cors_origin = origin;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }

    #[must_use]
    pub fn min_instructions_length(&self) -> usize {
        self.min_instructions_length
    }

    #[must_use]
    pub fn expose_store_errors(&self) -> bool {
        self.expose_store_errors
    }

    #[must_use]
    pub fn cors_origin(&self) -> Option<&str> {
        self.cors_origin.as_deref()
    }
}

/// Everything a handler needs, shared as `Extension<Arc<AppState>>`.
#[derive(Clone)]
pub struct AppState {
    config: AppConfig,
    store: Arc<dyn CredentialStore>,
    auth: AuthService,
    recipes: RecipeService,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: AppConfig,
        store: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        hashing: PasswordHashing,
    ) -> Self {
        let carrier = SessionCarrier::new(sessions, config.session_ttl_seconds());
        let auth = AuthService::new(store.clone(), carrier, hashing);
        let recipes = RecipeService::new(
            store.clone(),
            RecipeRules::default().with_min_instructions_length(config.min_instructions_length()),
        );
        Self {
            config,
            store,
            auth,
            recipes,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    #[must_use]
    pub fn recipes(&self) -> &RecipeService {
        &self.recipes
    }
}
