use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role of a user account.
/// Corresponds to the `user_role` SQL enum.
///
/// The first account ever registered receives `Admin`; every later account
/// starts as `User` and can only be changed through promotion.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular user: may read tasks.
    User,
    /// Administrator: may create, update, and delete tasks, and promote users.
    Admin,
}

/// Represents a user account as stored in the database.
///
/// The password hash is deserialized from storage but never serialized
/// outward; responses use [`UserPublic`].
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

/// The sanitized view of a user returned by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl User {
    /// Strips credentials, leaving only the fields safe to return.
    pub fn public(&self) -> UserPublic {
        UserPublic {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}
