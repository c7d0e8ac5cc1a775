//! `PostgreSQL` implementation of the store traits.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row};
use tracing::{Instrument, Span, info_span};

use super::{
    CredentialStore, NewRecipe, NewUser, OwnedRecipe, Recipe, SessionStore, StoreError, User,
};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

const OWNED_RECIPE_COLUMNS: &str = r"
    r.id, r.title, r.instructions, r.minutes_to_complete, r.user_id,
    u.username AS owner_username,
    u.password_hash AS owner_password_hash,
    u.image_url AS owner_image_url,
    u.bio AS owner_bio
";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables and indexes if they are missing.
    ///
    /// # Errors
    /// Returns an error if any schema statement fails.
    pub async fn ensure_schema(&self) -> Result<()> {
        for (index, statement) in split_sql_statements(SCHEMA_SQL).iter().enumerate() {
            sqlx::query(statement)
                .execute(&self.pool)
                .instrument(query_span("DDL", statement))
                .await
                .with_context(|| format!("failed to execute schema statement {}", index + 1))?;
        }
        Ok(())
    }
}

fn query_span(operation: &str, statement: &str) -> Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|code| code.to_string()),
        _ => None,
    }
}

/// Map constraint failures to typed store errors.
fn classify(err: sqlx::Error, user_id: Option<i64>) -> StoreError {
    match (sqlstate(&err).as_deref(), user_id) {
        (Some(UNIQUE_VIOLATION), _) => StoreError::Duplicate,
        (Some(FOREIGN_KEY_VIOLATION), Some(id)) => StoreError::MissingUser(id),
        (Some(CHECK_VIOLATION), _) => {
            let message = match &err {
                sqlx::Error::Database(db_err) => db_err.message().to_string(),
                other => other.to_string(),
            };
            StoreError::Constraint(message)
        }
        _ => StoreError::Database(err),
    }
}

pub(crate) fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;

        let query = r"
            INSERT INTO users (username, password_hash, image_url, bio)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, image_url, bio
        ";
        let result = sqlx::query_as::<_, User>(query)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.image_url)
            .bind(&user.bio)
            .fetch_one(&mut *tx)
            .instrument(query_span("INSERT", query))
            .await;

        match result {
            Ok(created) => {
                tx.commit().await?;
                Ok(created)
            }
            Err(err) => {
                let _ = tx.rollback().await;
                Err(classify(err, None))
            }
        }
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        // user_sessions rows go with it (ON DELETE CASCADE).
        let query = "DELETE FROM users WHERE id = $1";
        let result = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .map_err(|err| classify(err, None))?;
        Ok(result.rows_affected() > 0)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let query = "SELECT id, username, password_hash, image_url, bio FROM users WHERE id = $1";
        let user = sqlx::query_as::<_, User>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;
        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query =
            "SELECT id, username, password_hash, image_url, bio FROM users WHERE username = $1";
        let user = sqlx::query_as::<_, User>(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;
        Ok(user)
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<OwnedRecipe, StoreError> {
        let mut tx = self.pool.begin().await?;

        let query = r"
            INSERT INTO recipes (title, instructions, minutes_to_complete, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, instructions, minutes_to_complete, user_id
        ";
        let inserted = sqlx::query_as::<_, Recipe>(query)
            .bind(&recipe.title)
            .bind(&recipe.instructions)
            .bind(recipe.minutes_to_complete)
            .bind(recipe.user_id)
            .fetch_one(&mut *tx)
            .instrument(query_span("INSERT", query))
            .await;

        let inserted = match inserted {
            Ok(inserted) => inserted,
            Err(err) => {
                let _ = tx.rollback().await;
                return Err(classify(err, Some(recipe.user_id)));
            }
        };

        let query = "SELECT id, username, password_hash, image_url, bio FROM users WHERE id = $1";
        let owner = sqlx::query_as::<_, User>(query)
            .bind(inserted.user_id)
            .fetch_optional(&mut *tx)
            .instrument(query_span("SELECT", query))
            .await;

        let owner = match owner {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                let _ = tx.rollback().await;
                return Err(StoreError::MissingUser(recipe.user_id));
            }
            Err(err) => {
                let _ = tx.rollback().await;
                return Err(StoreError::Database(err));
            }
        };

        tx.commit().await?;

        Ok(OwnedRecipe {
            recipe: inserted,
            owner,
        })
    }

    async fn list_recipes(&self) -> Result<Vec<OwnedRecipe>, StoreError> {
        let query = format!(
            "SELECT {OWNED_RECIPE_COLUMNS} FROM recipes r JOIN users u ON u.id = r.user_id ORDER BY r.id"
        );
        let recipes = sqlx::query_as::<_, OwnedRecipe>(&query)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await?;
        Ok(recipes)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn insert_session(
        &self,
        token_hash: &[u8],
        user_id: i64,
        ttl_seconds: i64,
    ) -> Result<(), StoreError> {
        let query = r"
            INSERT INTO user_sessions (session_hash, user_id, expires_at)
            VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
        ";
        sqlx::query(query)
            .bind(token_hash)
            .bind(user_id)
            .bind(ttl_seconds)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .map_err(|err| classify(err, Some(user_id)))?;
        Ok(())
    }

    async fn lookup_session(&self, token_hash: &[u8]) -> Result<Option<i64>, StoreError> {
        let query =
            "SELECT user_id FROM user_sessions WHERE session_hash = $1 AND expires_at > NOW()";
        let row = sqlx::query(query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;
        Ok(row.map(|row| row.try_get("user_id")).transpose()?)
    }

    async fn delete_session(&self, token_hash: &[u8]) -> Result<bool, StoreError> {
        let query = "DELETE FROM user_sessions WHERE session_hash = $1";
        let result = sqlx::query(query)
            .bind(token_hash)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
