//! Integration tests for the session lifecycle against the mock backend.
//!
//! Covers profile checks, login, logout and token refresh, including the
//! background refresh task and its interaction with logout.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;
use std::time::Duration;

use atelier_client::{AuthError, SessionState, TokenKind, TokenStore};
use atelier_integration_tests::{MockBackend, MockState, VALID_EMAIL, VALID_PASSWORD};
use secrecy::SecretString;

const SLOW: Duration = Duration::from_secs(3600);

// =============================================================================
// Session Check Tests
// =============================================================================

#[tokio::test]
async fn test_check_auth_without_token_makes_no_request() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);

    let state = client.state.session().check_auth().await;

    assert_eq!(state, SessionState::Unauthenticated);
    assert!(!client.state.session().is_authenticated());
    assert_eq!(backend.state.calls.total(), 0);
}

#[tokio::test]
async fn test_check_auth_with_valid_token_restores_session() {
    let backend = MockBackend::start().await;
    let first = backend.client(SLOW);
    first.state.session().login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();

    // A second client sharing the persisted tokens, as after a restart.
    let second = backend.client(SLOW);
    second
        .tokens
        .set(
            TokenKind::Access,
            SecretString::from(backend.state.current_access_token()),
        )
        .unwrap();

    let state = second.state.session().check_auth().await;

    assert_eq!(state, SessionState::Authenticated);
    assert_eq!(
        second.state.session().current_user().unwrap().email.as_str(),
        VALID_EMAIL
    );
    assert!(second.state.session().is_refresh_scheduled());
    assert_eq!(MockState::count(&backend.state.calls.profile), 1);
}

#[tokio::test]
async fn test_check_auth_with_rejected_token_clears_both_tokens() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);
    client
        .tokens
        .set(TokenKind::Access, SecretString::from("stale-access".to_string()))
        .unwrap();
    client
        .tokens
        .set(TokenKind::Refresh, SecretString::from("stale-refresh".to_string()))
        .unwrap();

    let state = client.state.session().check_auth().await;

    assert_eq!(state, SessionState::Unauthenticated);
    assert!(client.tokens_cleared());

    // Second check: nothing stored, so no further request.
    client.state.session().check_auth().await;
    assert!(client.tokens_cleared());
    assert_eq!(MockState::count(&backend.state.calls.profile), 1);
}

#[tokio::test]
async fn test_check_auth_profile_failure_after_login_signs_out() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);
    client.state.session().login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();

    backend.state.fail_profile.store(true, Ordering::SeqCst);
    let state = client.state.session().check_auth().await;

    assert_eq!(state, SessionState::Unauthenticated);
    assert!(client.tokens_cleared());
    assert!(!client.state.session().is_refresh_scheduled());
}

#[tokio::test]
async fn test_check_auth_after_tokens_cleared_elsewhere_signs_out() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);
    client.state.session().login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();

    // Another process sharing the store logged out.
    client.tokens.clear().unwrap();
    let state = client.state.session().check_auth().await;

    assert_eq!(state, SessionState::Unauthenticated);
    assert!(client.state.session().current_user().is_none());
    assert!(!client.state.session().is_refresh_scheduled());
    assert_eq!(MockState::count(&backend.state.calls.profile), 0);
}

// =============================================================================
// Login Tests
// =============================================================================

#[tokio::test]
async fn test_login_persists_tokens_and_authenticates() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);

    let user = client
        .state
        .session()
        .login(VALID_EMAIL, VALID_PASSWORD)
        .await
        .unwrap();

    assert_eq!(user.email.as_str(), VALID_EMAIL);
    assert!(client.state.session().is_authenticated());
    assert_eq!(
        client.token(TokenKind::Access).unwrap(),
        backend.state.current_access_token()
    );
    assert_eq!(
        client.token(TokenKind::Refresh).unwrap(),
        backend.state.current_refresh_token()
    );
    assert!(client.state.session().is_refresh_scheduled());
}

#[tokio::test]
async fn test_login_wrong_password_fixed_message_and_no_tokens() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);

    let err = client
        .state
        .session()
        .login(VALID_EMAIL, "wrongpassword")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(err.to_string(), "Email/Password Wrong");
    assert!(client.tokens_cleared());
    assert_eq!(client.state.session().state(), SessionState::Unauthenticated);
    assert!(!client.state.session().is_refresh_scheduled());
}

#[tokio::test]
async fn test_failed_login_keeps_existing_session() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);
    client.state.session().login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();
    let access = client.token(TokenKind::Access).unwrap();
    let refresh = client.token(TokenKind::Refresh).unwrap();

    let err = client
        .state
        .session()
        .login("other@x.com", "wrongpassword")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(client.state.session().is_authenticated());
    assert_eq!(client.state.session().state(), SessionState::Authenticated);
    assert_eq!(
        client.state.session().current_user().unwrap().email.as_str(),
        VALID_EMAIL
    );
    assert_eq!(client.token(TokenKind::Access).unwrap(), access);
    assert_eq!(client.token(TokenKind::Refresh).unwrap(), refresh);
    assert!(client.state.session().is_refresh_scheduled());
}

#[tokio::test]
async fn test_login_rejects_malformed_email_without_request() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);

    let err = client
        .state
        .session()
        .login("not-an-email", VALID_PASSWORD)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidEmail(_)));
    let err = client.state.session().login(VALID_EMAIL, "").await.unwrap_err();
    assert!(matches!(err, AuthError::MissingPassword));
    assert_eq!(MockState::count(&backend.state.calls.login), 0);
}

// =============================================================================
// Logout Tests
// =============================================================================

#[tokio::test]
async fn test_logout_clears_tokens() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);
    client.state.session().login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();

    client.state.session().logout().await;

    assert!(client.tokens_cleared());
    assert!(client.state.session().current_user().is_none());
    assert!(!client.state.session().is_refresh_scheduled());
    assert_eq!(MockState::count(&backend.state.calls.logout), 1);
}

#[tokio::test]
async fn test_logout_clears_tokens_when_backend_fails() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);
    client.state.session().login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();
    backend.state.fail_logout.store(true, Ordering::SeqCst);

    client.state.session().logout().await;

    assert!(client.tokens_cleared());
    assert_eq!(client.state.session().state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_logout_clears_tokens_when_backend_unreachable() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);
    client.state.session().login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();

    drop(backend);
    client.state.session().logout().await;

    assert!(client.tokens_cleared());
    assert!(!client.state.session().is_authenticated());
}

// =============================================================================
// Refresh Tests
// =============================================================================

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);
    client.state.session().login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();
    let before = client.token(TokenKind::Access).unwrap();

    client.state.session().refresh_token().await.unwrap();

    let after = client.token(TokenKind::Access).unwrap();
    assert_ne!(before, after);
    assert_eq!(after, backend.state.current_access_token());
    assert!(client.state.session().is_authenticated());
}

#[tokio::test]
async fn test_refresh_failure_matches_logout_state() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);
    client.state.session().login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();
    backend.state.fail_refresh.store(true, Ordering::SeqCst);

    let err = client.state.session().refresh_token().await.unwrap_err();

    assert!(matches!(err, AuthError::SessionExpired));
    assert!(client.tokens_cleared());
    assert!(client.state.session().current_user().is_none());
    assert_eq!(client.state.session().state(), SessionState::Unauthenticated);
    assert!(!client.state.session().is_refresh_scheduled());
}

#[tokio::test]
async fn test_refresh_without_refresh_token_is_session_expired() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);

    let err = client.state.session().refresh_token().await.unwrap_err();

    assert!(matches!(err, AuthError::SessionExpired));
    assert_eq!(MockState::count(&backend.state.calls.refresh), 0);
}

#[tokio::test]
async fn test_background_refresh_runs_until_logout() {
    let backend = MockBackend::start().await;
    let client = backend.client(Duration::from_millis(100));
    client.state.session().login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();

    tokio::time::sleep(Duration::from_millis(350)).await;
    let refreshed = MockState::count(&backend.state.calls.refresh);
    assert!(refreshed >= 2, "expected periodic refreshes, got {refreshed}");
    assert!(client.state.session().is_authenticated());

    client.state.session().logout().await;
    let at_logout = MockState::count(&backend.state.calls.refresh);
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(MockState::count(&backend.state.calls.refresh), at_logout);
    assert!(!client.state.session().is_refresh_scheduled());
}

#[tokio::test]
async fn test_background_refresh_failure_signs_out() {
    let backend = MockBackend::start().await;
    let client = backend.client(Duration::from_millis(100));
    client.state.session().login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();
    backend.state.fail_refresh.store(true, Ordering::SeqCst);

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(client.tokens_cleared());
    assert_eq!(client.state.session().state(), SessionState::Unauthenticated);
    assert_eq!(MockState::count(&backend.state.calls.refresh), 1);
}

#[tokio::test]
async fn test_logout_wins_over_in_flight_refresh() {
    let backend = MockBackend::start().await;
    let client = backend.client(SLOW);
    client.state.session().login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();
    backend.state.set_refresh_delay(Duration::from_millis(200));

    let session = client.state.session().clone();
    let refresh = tokio::spawn(async move { session.refresh_token().await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    client.state.session().logout().await;
    let _ = refresh.await.unwrap();

    assert!(client.tokens_cleared());
    assert_eq!(client.state.session().state(), SessionState::Unauthenticated);
    assert_eq!(MockState::count(&backend.state.calls.refresh), 1);
}
