//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::User;

/// Fields are optional so a missing value surfaces as a domain error
/// instead of a deserialization failure.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// A user as clients see it. Never carries the password hash.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            image_url: user.image_url,
            bio: user.bio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn public_user_omits_password_hash() -> Result<()> {
        let user = User {
            id: 1,
            username: "chef1".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            image_url: None,
            bio: None,
        };
        let json = serde_json::to_value(PublicUser::from(user))?;
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "username": "chef1", "image_url": null, "bio": null})
        );
        Ok(())
    }
}
