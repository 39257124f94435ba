//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use talent_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash; never serialize it. Use [`UserResponse`] for
/// API output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    /// Login name; for invited clients this is their email address.
    pub username: String,
    /// `None` until the user completes registration.
    pub password_hash: Option<String>,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    /// Free-form object of optional string attributes.
    pub profile: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// First and last name joined, falling back to the username.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub role: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub profile: serde_json::Value,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
            name: user.display_name(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            avatar_url: user.avatar_url.clone(),
            profile: user.profile.clone(),
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: Option<String>,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
}

/// DTO for a profile update. `profile` keys are merged into the stored
/// object; a key set to `null` is kept as `null`.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile: Option<serde_json::Value>,
}

/// The other side of a representation, as listed for messaging and sharing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ConnectedUser {
    pub id: DbId,
    pub name: String,
}
