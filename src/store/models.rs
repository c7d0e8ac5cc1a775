use sqlx::{FromRow, Row, postgres::PgRow};

/// A persisted account. `password_hash` is an Argon2id PHC string.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

// Keep the hash out of logs and panics.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("image_url", &self.image_url)
            .field("bio", &self.bio)
            .finish_non_exhaustive()
    }
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            image_url: row.try_get("image_url")?,
            bio: row.try_get("bio")?,
        })
    }
}

#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user_id: i64,
}

impl<'r> FromRow<'r, PgRow> for Recipe {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            instructions: row.try_get("instructions")?,
            minutes_to_complete: row.try_get("minutes_to_complete")?,
            user_id: row.try_get("user_id")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user_id: i64,
}

/// A recipe joined with the user that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedRecipe {
    pub recipe: Recipe,
    pub owner: User,
}

impl<'r> FromRow<'r, PgRow> for OwnedRecipe {
    /// Expects the recipe columns plus the owner columns prefixed with `owner_`.
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let recipe = Recipe::from_row(row)?;
        let owner = User {
            id: recipe.user_id,
            username: row.try_get("owner_username")?,
            password_hash: row.try_get("owner_password_hash")?,
            image_url: row.try_get("owner_image_url")?,
            bio: row.try_get("owner_bio")?,
        };
        Ok(Self { recipe, owner })
    }
}
