//! Back-office users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, UserId, UserRole};
use crate::validation::{ValidationError, require};

/// Minimum password length accepted when creating a user.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A back-office user as returned by `/auth/profile` and `/admin/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    #[serde(alias = "_id")]
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// User's display name.
    #[serde(default)]
    pub name: String,
    /// User's role.
    pub role: UserRole,
    /// When the user was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the user was last updated.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Writable fields for creating or updating a user.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Required on create, optional on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl std::fmt::Debug for UserDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDraft")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl UserDraft {
    /// Validate the draft before sending it to the backend.
    ///
    /// # Errors
    ///
    /// Returns the first failing field: a missing name, a malformed email, or
    /// a password shorter than [`MIN_PASSWORD_LENGTH`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        Email::parse(&self.email).map_err(|e| ValidationError::Invalid {
            field: "email",
            reason: e.to_string(),
        })?;
        let too_short = self
            .password
            .as_ref()
            .is_some_and(|password| password.chars().count() < MIN_PASSWORD_LENGTH);
        if too_short {
            return Err(ValidationError::Invalid {
                field: "password",
                reason: format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
            });
        }
        Ok(())
    }
}
