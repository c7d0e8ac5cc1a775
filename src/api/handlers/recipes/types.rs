//! Request/response types for recipe endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{api::handlers::auth::types::PublicUser, recipes::RecipeInput, store::OwnedRecipe};

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct RecipeRequest {
    pub title: Option<String>,
    pub instructions: Option<String>,
    /// Any JSON value is accepted here; non-integers fail validation with a message.
    #[schema(value_type = Option<i32>, minimum = 1)]
    pub minutes_to_complete: Option<Value>,
}

impl RecipeRequest {
    /// Convert into the domain input. A present but non-integer
    /// `minutes_to_complete` becomes `Some(0)` so validation rejects it.
    #[must_use]
    pub fn into_input(self) -> RecipeInput {
        let minutes_to_complete = match self.minutes_to_complete {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.as_i64().unwrap_or(0)),
        };
        RecipeInput {
            title: self.title,
            instructions: self.instructions,
            minutes_to_complete,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicRecipe {
    pub id: i64,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user: PublicUser,
}

impl From<OwnedRecipe> for PublicRecipe {
    fn from(owned: OwnedRecipe) -> Self {
        Self {
            id: owned.recipe.id,
            title: owned.recipe.title,
            instructions: owned.recipe.instructions,
            minutes_to_complete: owned.recipe.minutes_to_complete,
            user: owned.owner.into(),
        }
    }
}
