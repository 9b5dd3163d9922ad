//! Authentication errors.

use atelier_core::EmailError;
use thiserror::Error;

use crate::api::ApiError;
use crate::token_store::TokenStoreError;

/// Errors from login, refresh and profile checks.
///
/// `Display` never contains backend details; it is what the login form shows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend rejected the email/password pair.
    #[error("Email/Password Wrong")]
    InvalidCredentials,

    #[error("Please enter a valid email address")]
    InvalidEmail(#[from] EmailError),

    #[error("Password is required")]
    MissingPassword,

    /// No usable refresh token, or the backend refused it.
    #[error("Your session has expired. Please sign in again.")]
    SessionExpired,

    /// The backend answered 2xx without the fields a session needs.
    #[error("Unexpected response from the server.")]
    IncompleteResponse,

    /// A logout ended the session while the call was in flight.
    #[error("The session was closed.")]
    Cancelled,

    #[error("Could not save the session on this device.")]
    Storage(#[from] TokenStoreError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Map a login failure: any 401 means wrong credentials.
    pub(crate) fn from_login(err: ApiError) -> Self {
        if err.is_unauthorized() {
            Self::InvalidCredentials
        } else {
            Self::Api(err)
        }
    }

    /// Map a refresh failure: any 401 means the refresh token is dead.
    pub(crate) fn from_refresh(err: ApiError) -> Self {
        if err.is_unauthorized() {
            Self::SessionExpired
        } else {
            Self::Api(err)
        }
    }
}
