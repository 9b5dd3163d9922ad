//! Authentication payloads.
//!
//! Every type holding a credential implements `Debug` manually so tokens and
//! passwords never end up in logs.

use serde::{Deserialize, Serialize};

use super::user::User;
use crate::types::Email;

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /auth/refresh`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl std::fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// An access/refresh token pair issued by the backend.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

impl TokenPair {
    /// Both tokens are present and non-blank.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.access_token.trim().is_empty() && !self.refresh_token.trim().is_empty()
    }
}

/// Tokens either nested under `tokens` or inlined next to the other fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TokenEnvelope {
    Nested { tokens: TokenPair },
    Flat(TokenPair),
}

impl TokenEnvelope {
    #[must_use]
    pub fn into_tokens(self) -> TokenPair {
        match self {
            Self::Nested { tokens } | Self::Flat(tokens) => tokens,
        }
    }
}

/// `data` of a successful `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginPayload {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenEnvelope,
}

/// `data` of `GET /auth/profile`: the user, bare or wrapped in `user`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProfilePayload {
    Wrapped { user: User },
    Bare(User),
}

impl ProfilePayload {
    #[must_use]
    pub fn into_user(self) -> User {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const USER: &str =
        r#"{"id": "u1", "email": "valid@x.com", "name": "Valid", "role": "admin"}"#;

    #[test]
    fn test_login_payload_nested_tokens() {
        let json = format!(
            r#"{{"user": {USER}, "tokens": {{"accessToken": "a1", "refreshToken": "r1"}}}}"#
        );
        let payload: LoginPayload = serde_json::from_str(&json).unwrap();
        let tokens = payload.tokens.into_tokens();
        assert_eq!(tokens.access_token, "a1");
        assert_eq!(tokens.refresh_token, "r1");
        assert_eq!(payload.user.name, "Valid");
    }

    #[test]
    fn test_login_payload_flat_tokens() {
        let json = format!(r#"{{"user": {USER}, "accessToken": "a2", "refreshToken": "r2"}}"#);
        let payload: LoginPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(payload.tokens.into_tokens().access_token, "a2");
    }

    #[test]
    fn test_login_payload_without_tokens_is_rejected() {
        let json = format!(r#"{{"user": {USER}}}"#);
        assert!(serde_json::from_str::<LoginPayload>(&json).is_err());
    }

    #[test]
    fn test_profile_payload_shapes() {
        let bare: ProfilePayload = serde_json::from_str(USER).unwrap();
        let wrapped: ProfilePayload = serde_json::from_str(&format!(r#"{{"user": {USER}}}"#)).unwrap();
        assert_eq!(bare.into_user(), wrapped.into_user());
    }

    #[test]
    fn test_token_debug_redacted() {
        let tokens = TokenPair {
            access_token: "secret-access".to_string(),
            refresh_token: "secret-refresh".to_string(),
        };
        let debug = format!("{tokens:?}");
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
        assert!(tokens.is_complete());
    }
}
