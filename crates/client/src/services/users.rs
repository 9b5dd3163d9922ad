//! Back-office users (`/admin/users`).

use atelier_core::{ListPayload, User, UserDraft, UserId, ValidationError};
use serde_json::Value;
use tracing::instrument;

use super::resource_path;
use crate::api::{ApiClient, ApiResult};

const USERS: &str = "/admin/users";

/// Admin user management. The backend restricts it to super admins.
#[derive(Debug, Clone, Copy)]
pub struct UserService<'a> {
    api: &'a ApiClient,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`](crate::api::ApiError::Forbidden) for
    /// callers without user management rights.
    #[instrument(skip(self))]
    pub async fn list(&self) -> ApiResult<Vec<User>> {
        self.api
            .get::<ListPayload<User>>(USERS)
            .await
            .map(ListPayload::into_items)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`](crate::api::ApiError::NotFound) for an unknown id.
    #[instrument(skip(self, id), fields(user_id = %id))]
    pub async fn get(&self, id: &UserId) -> ApiResult<User> {
        self.api.get(&resource_path(USERS, id.as_str())).await
    }

    /// Create a user. A new user must have a password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`](crate::api::ApiError::Invalid) without a
    /// request if the draft is invalid or has no password.
    #[instrument(skip(self, draft), fields(email = %draft.email))]
    pub async fn create(&self, draft: &UserDraft) -> ApiResult<User> {
        if draft.password.is_none() {
            return Err(ValidationError::Required("password").into());
        }
        draft.validate()?;
        self.api.post(USERS, draft).await
    }

    /// Update a user; a `None` password leaves it unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`](crate::api::ApiError::Invalid) without a
    /// request if the draft is invalid.
    #[instrument(skip(self, id, draft), fields(user_id = %id))]
    pub async fn update(&self, id: &UserId, draft: &UserDraft) -> ApiResult<User> {
        draft.validate()?;
        self.api.put(&resource_path(USERS, id.as_str()), draft).await
    }

    /// # Errors
    ///
    /// Returns the sanitized [`ApiError`](crate::api::ApiError) of the call.
    #[instrument(skip(self, id), fields(user_id = %id))]
    pub async fn delete(&self, id: &UserId) -> ApiResult<()> {
        self.api
            .delete::<Value>(&resource_path(USERS, id.as_str()))
            .await
            .map(drop)
    }
}
