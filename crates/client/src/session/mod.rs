//! Authenticated session lifecycle.
//!
//! A [`SessionManager`] owns the current user, the persisted token pair and
//! the background refresh task. Consumers receive a clone of the handle;
//! there is no global session.
//!
//! # State machine
//!
//! ```text
//! Unauthenticated --login / check_auth--> Authenticating
//! Authenticating  --success-------------> Authenticated
//! Authenticating  --failure-------------> Unauthenticated
//! Authenticated   --refresh ok----------> Authenticated
//! Authenticated   --refresh failure-----> Unauthenticated
//! any             --logout--------------> Unauthenticated
//! ```
//!
//! Every teardown bumps a session epoch. Work that started in an older epoch
//! (a refresh or login still in flight when `logout` ran) discards its
//! result, so logout always wins.

mod error;
mod refresh;

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use atelier_core::{
    Email, LoginPayload, LoginRequest, ProfilePayload, RefreshRequest, TokenEnvelope, TokenPair,
    User,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::api::{ApiClient, ApiError};
use crate::logging;
use crate::token_store::{TokenKind, TokenStore, TokenStoreError};

pub use error::AuthError;

/// Phase of the session state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("unauthenticated"),
            Self::Authenticating => f.write_str("authenticating"),
            Self::Authenticated => f.write_str("authenticated"),
        }
    }
}

/// Handle to the session. Clones share one session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

pub(crate) struct SessionInner {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    refresh_interval: Duration,
    state: RwLock<Snapshot>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Default)]
struct Snapshot {
    phase: SessionState,
    user: Option<User>,
    epoch: u64,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        let timer = self
            .timer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = timer {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state())
            .field("refresh_interval", &self.inner.refresh_interval)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager with no active session.
    ///
    /// `tokens` must be the store `api` reads its bearer token from.
    #[must_use]
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenStore>, refresh_interval: Duration) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                api,
                tokens,
                refresh_interval,
                state: RwLock::new(Snapshot::default()),
                timer: Mutex::new(None),
            }),
        }
    }

    pub(crate) const fn from_inner(inner: Arc<SessionInner>) -> Self {
        Self { inner }
    }

    /// The API client this session authenticates.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.read().phase
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        let state = self.read();
        state.phase == SessionState::Authenticated && state.user.is_some()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.read().user.clone()
    }

    /// Whether the background refresh task is running.
    #[must_use]
    pub fn is_refresh_scheduled(&self) -> bool {
        self.lock_timer()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Restore a persisted session.
    ///
    /// Without a stored access token this makes no network call and ends
    /// any session still held in memory. Otherwise
    /// the profile is fetched; on success the session becomes authenticated,
    /// on any failure both tokens are cleared.
    #[instrument(skip(self))]
    pub async fn check_auth(&self) -> SessionState {
        if self.inner.tokens.get(TokenKind::Access).is_none() {
            // Another process may have cleared the store under a live session.
            if self.state() == SessionState::Authenticated {
                self.teardown();
            }
            return self.state();
        }

        let (epoch, _) = self.begin_authenticating();
        match self.fetch_profile().await {
            Ok(user) => {
                if self.establish(epoch, user, None).unwrap_or(false) {
                    self.start_refresh_timer();
                }
            }
            Err(err) => {
                logging::diagnostic("session check failed", &err);
                if self.epoch() == epoch {
                    self.teardown();
                }
            }
        }
        self.state()
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the backend answers
    /// 401, a validation error for a malformed email or empty password, and
    /// a sanitized [`AuthError::Api`] for everything else. No tokens are
    /// persisted on failure, and an already established session is kept.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }

        let (epoch, had_session) = self.begin_authenticating();
        let request = LoginRequest {
            email,
            password: password.to_string(),
        };

        let result = match self.inner.api.post::<LoginPayload, _>("/auth/login", &request).await {
            Ok(payload) => {
                let tokens = payload.tokens.into_tokens();
                if tokens.is_complete() {
                    self.establish(epoch, payload.user, Some(&tokens))
                        .map_err(AuthError::from)
                        .and_then(|current| {
                            if current {
                                Ok(())
                            } else {
                                Err(AuthError::Cancelled)
                            }
                        })
                } else {
                    Err(AuthError::IncompleteResponse)
                }
            }
            Err(err) => Err(AuthError::from_login(err)),
        };

        match result {
            Ok(()) => {
                self.start_refresh_timer();
                let user = self.current_user().ok_or(AuthError::Cancelled)?;
                tracing::info!(user_id = %user.id, "signed in");
                Ok(user)
            }
            Err(err) => {
                logging::diagnostic("login failed", &err);
                // A failed attempt leaves an existing session untouched.
                if self.epoch() == epoch && !had_session {
                    self.teardown();
                }
                Err(err)
            }
        }
    }

    /// Sign out.
    ///
    /// The backend is told on a best-effort basis; its failure is ignored.
    /// Tokens, user and refresh task are always cleared.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if self.inner.tokens.get(TokenKind::Access).is_some() {
            let body = self
                .inner
                .tokens
                .get(TokenKind::Refresh)
                .map(|t| RefreshRequest {
                    refresh_token: t.expose_secret().to_string(),
                });
            if let Err(err) = self
                .inner
                .api
                .post::<serde_json::Value, _>("/auth/logout", &body)
                .await
            {
                logging::diagnostic("logout request failed", &err);
            }
        }
        self.teardown();
        tracing::info!("signed out");
    }

    /// Exchange the refresh token for a new token pair.
    ///
    /// A refresh that started before a logout leaves the cleared session
    /// alone.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionExpired`] when no refresh token is stored
    /// or the backend refuses it. Every failure also logs the session out.
    #[instrument(skip(self))]
    pub async fn refresh_token(&self) -> Result<(), AuthError> {
        let epoch = self.epoch();

        let Some(refresh_token) = self.inner.tokens.get(TokenKind::Refresh) else {
            self.logout_if_current(epoch).await;
            return Err(AuthError::SessionExpired);
        };

        let request = RefreshRequest {
            refresh_token: refresh_token.expose_secret().to_string(),
        };
        let result = match self
            .inner
            .api
            .post::<TokenEnvelope, _>("/auth/refresh", &request)
            .await
        {
            Ok(envelope) => {
                let tokens = envelope.into_tokens();
                if tokens.is_complete() {
                    self.replace_tokens(epoch, &tokens).map_err(AuthError::from)
                } else {
                    Err(AuthError::IncompleteResponse)
                }
            }
            Err(err) => Err(AuthError::from_refresh(err)),
        };

        if let Err(err) = &result {
            logging::diagnostic("token refresh failed", err);
            self.logout_if_current(epoch).await;
        } else {
            tracing::debug!("tokens refreshed");
        }
        result
    }

    /// Stop the background refresh without ending the session.
    pub fn stop_refresh(&self) {
        if let Some(handle) = self.lock_timer().take() {
            handle.abort();
        }
    }

    async fn fetch_profile(&self) -> Result<User, ApiError> {
        self.inner
            .api
            .get::<ProfilePayload>("/auth/profile")
            .await
            .map(ProfilePayload::into_user)
    }

    async fn logout_if_current(&self, epoch: u64) {
        if self.epoch() == epoch {
            self.logout().await;
        }
    }

    /// Enter `Authenticating` unless a session is already established.
    ///
    /// Returns the current epoch and whether a session was established.
    fn begin_authenticating(&self) -> (u64, bool) {
        let mut state = self.write();
        let had_session = state.phase == SessionState::Authenticated;
        if !had_session {
            state.phase = SessionState::Authenticating;
        }
        (state.epoch, had_session)
    }

    /// Make `user` the signed-in user, persisting `tokens` if given.
    ///
    /// Returns `false` without touching anything if the epoch moved on.
    fn establish(
        &self,
        epoch: u64,
        user: User,
        tokens: Option<&TokenPair>,
    ) -> Result<bool, TokenStoreError> {
        let mut state = self.write();
        if state.epoch != epoch {
            return Ok(false);
        }
        if let Some(tokens) = tokens {
            self.inner.tokens.set_pair(tokens)?;
        }
        state.user = Some(user);
        state.phase = SessionState::Authenticated;
        Ok(true)
    }

    /// Overwrite the token pair unless a logout happened since `epoch`.
    fn replace_tokens(&self, epoch: u64, tokens: &TokenPair) -> Result<(), TokenStoreError> {
        let state = self.write();
        if state.epoch != epoch {
            tracing::debug!("discarding refresh result of a closed session");
            return Ok(());
        }
        self.inner.tokens.set_pair(tokens)
    }

    /// End the session: new epoch, no user, no tokens, no refresh task.
    fn teardown(&self) {
        {
            let mut state = self.write();
            state.epoch = state.epoch.wrapping_add(1);
            state.phase = SessionState::Unauthenticated;
            state.user = None;
            if let Err(err) = self.inner.tokens.clear() {
                logging::diagnostic("could not clear stored tokens", &err);
            }
        }
        // Last: when called from the refresh task this aborts the caller.
        self.stop_refresh();
    }

    fn start_refresh_timer(&self) {
        let handle = tokio::spawn(refresh::run(
            Arc::downgrade(&self.inner),
            self.inner.refresh_interval,
        ));
        if let Some(previous) = self.lock_timer().replace(handle) {
            previous.abort();
        }
    }

    fn epoch(&self) -> u64 {
        self.read().epoch
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_timer(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
