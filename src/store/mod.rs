//! Persistence for users, recipes and sessions.
//!
//! Handlers and services only see the [`CredentialStore`] and [`SessionStore`]
//! traits. [`PgStore`] is the production implementation; [`MemoryStore`]
//! upholds the same invariants without a database and backs the tests and
//! `--in-memory` runs.
//!
//! Every write is atomic: a failed insert never leaves a record visible to
//! later reads.

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryStore;
pub use models::{NewRecipe, NewUser, OwnedRecipe, Recipe, User};
pub use postgres::PgStore;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (username, session hash).
    #[error("record already exists")]
    Duplicate,
    /// The referenced owner does not exist.
    #[error("user {0} does not exist")]
    MissingUser(i64),
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// User and recipe collections.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user. Returns [`StoreError::Duplicate`] when the username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Remove a user together with its sessions. Returns `true` when a row was removed.
    async fn delete_user(&self, id: i64) -> Result<bool, StoreError>;

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Insert a recipe and return it joined with its owner.
    async fn create_recipe(&self, recipe: NewRecipe) -> Result<OwnedRecipe, StoreError>;

    /// All recipes of all owners, ordered by id.
    async fn list_recipes(&self) -> Result<Vec<OwnedRecipe>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Server-side session records keyed by the SHA-256 hash of the token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(
        &self,
        token_hash: &[u8],
        user_id: i64,
        ttl_seconds: i64,
    ) -> Result<(), StoreError>;

    /// Resolve an unexpired session to its user id.
    async fn lookup_session(&self, token_hash: &[u8]) -> Result<Option<i64>, StoreError>;

    /// Returns `true` when a record was removed.
    async fn delete_session(&self, token_hash: &[u8]) -> Result<bool, StoreError>;
}
