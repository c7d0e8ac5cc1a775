//! Shared recipe list: validation and the list/create operations.

pub mod validation;

pub use validation::{RecipeInput, RecipeRules, ValidRecipe};

use std::sync::Arc;
use tracing::info;

use crate::{
    error::ServiceError,
    sessions::SessionContext,
    store::{CredentialStore, NewRecipe, OwnedRecipe},
};

#[derive(Clone)]
pub struct RecipeService {
    store: Arc<dyn CredentialStore>,
    rules: RecipeRules,
}

impl RecipeService {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, rules: RecipeRules) -> Self {
        Self { store, rules }
    }

    #[must_use]
    pub fn rules(&self) -> &RecipeRules {
        &self.rules
    }

    /// Every recipe of every owner.
    ///
    /// # Errors
    /// `Auth` without an active session, `Store` if the read fails.
    pub async fn list(&self, session: &SessionContext) -> Result<Vec<OwnedRecipe>, ServiceError> {
        session.require_user()?;
        Ok(self.store.list_recipes().await?)
    }

    /// Validate and persist a recipe owned by the session user.
    ///
    /// # Errors
    /// `Auth` without an active session, `Validation` for bad input, `Store`
    /// if the insert is rejected (nothing is persisted in that case).
    pub async fn create(
        &self,
        session: &SessionContext,
        input: RecipeInput,
    ) -> Result<OwnedRecipe, ServiceError> {
        let user_id = session.require_user()?;
        let valid = self.rules.validate(input)?;

        let created = self
            .store
            .create_recipe(NewRecipe {
                title: valid.title,
                instructions: valid.instructions,
                minutes_to_complete: valid.minutes_to_complete,
                user_id,
            })
            .await?;

        info!(recipe_id = created.recipe.id, user_id, "recipe created");
        Ok(created)
    }
}
