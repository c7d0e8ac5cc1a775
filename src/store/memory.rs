//! In-process store with the same invariants as the `PostgreSQL` schema.
//!
//! A single mutex guards every collection, so the uniqueness check and the
//! insert of a user happen as one step.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::{
    CredentialStore, NewRecipe, NewUser, OwnedRecipe, Recipe, SessionStore, StoreError, User,
};

#[derive(Debug)]
struct SessionEntry {
    user_id: i64,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    recipes: BTreeMap<i64, Recipe>,
    sessions: HashMap<Vec<u8>, SessionEntry>,
    last_user_id: i64,
    last_recipe_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users, for assertions in tests.
    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    /// Number of stored sessions, expired ones included until they are read.
    pub async fn session_count(&self) -> usize {
        self.tables.lock().await.sessions.len()
    }

    /// Number of stored recipes, for assertions in tests.
    pub async fn recipe_count(&self) -> usize {
        self.tables.lock().await.recipes.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        if user.username.is_empty() {
            return Err(StoreError::Constraint("username must not be empty".to_string()));
        }

        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate);
        }

        tables.last_user_id += 1;
        let created = User {
            id: tables.last_user_id,
            username: user.username,
            password_hash: user.password_hash,
            image_url: user.image_url,
            bio: user.bio,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.recipes.values().any(|recipe| recipe.user_id == id) {
            return Err(StoreError::Constraint(format!("user {id} still owns recipes")));
        }
        let removed = tables.users.remove(&id).is_some();
        tables.sessions.retain(|_, entry| entry.user_id != id);
        Ok(removed)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<OwnedRecipe, StoreError> {
        if recipe.title.is_empty() {
            return Err(StoreError::Constraint("title must not be empty".to_string()));
        }
        if recipe.minutes_to_complete.is_some_and(|minutes| minutes <= 0) {
            return Err(StoreError::Constraint(
                "minutes_to_complete must be positive".to_string(),
            ));
        }

        let mut tables = self.tables.lock().await;
        let Some(owner) = tables.users.get(&recipe.user_id).cloned() else {
            return Err(StoreError::MissingUser(recipe.user_id));
        };

        tables.last_recipe_id += 1;
        let created = Recipe {
            id: tables.last_recipe_id,
            title: recipe.title,
            instructions: recipe.instructions,
            minutes_to_complete: recipe.minutes_to_complete,
            user_id: recipe.user_id,
        };
        tables.recipes.insert(created.id, created.clone());

        Ok(OwnedRecipe {
            recipe: created,
            owner,
        })
    }

    async fn list_recipes(&self) -> Result<Vec<OwnedRecipe>, StoreError> {
        let tables = self.tables.lock().await;
        tables
            .recipes
            .values()
            .map(|recipe| {
                let owner = tables
                    .users
                    .get(&recipe.user_id)
                    .cloned()
                    .ok_or(StoreError::MissingUser(recipe.user_id))?;
                Ok(OwnedRecipe {
                    recipe: recipe.clone(),
                    owner,
                })
            })
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(
        &self,
        token_hash: &[u8],
        user_id: i64,
        ttl_seconds: i64,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::MissingUser(user_id));
        }
        if tables.sessions.contains_key(token_hash) {
            return Err(StoreError::Duplicate);
        }
        let ttl = Duration::from_secs(u64::try_from(ttl_seconds).unwrap_or(0));
        let expires_at = Instant::now().checked_add(ttl).ok_or_else(|| {
            StoreError::Constraint(format!("session lifetime of {ttl_seconds}s is out of range"))
        })?;
        tables
            .sessions
            .insert(token_hash.to_vec(), SessionEntry { user_id, expires_at });
        Ok(())
    }

    async fn lookup_session(&self, token_hash: &[u8]) -> Result<Option<i64>, StoreError> {
        let mut tables = self.tables.lock().await;
        let Some(entry) = tables.sessions.get(token_hash) else {
            return Ok(None);
        };
        if entry.expires_at > Instant::now() {
            return Ok(Some(entry.user_id));
        }
        tables.sessions.remove(token_hash);
        Ok(None)
    }

    async fn delete_session(&self, token_hash: &[u8]) -> Result<bool, StoreError> {
        Ok(self.tables.lock().await.sessions.remove(token_hash).is_some())
    }
}
