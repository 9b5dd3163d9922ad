//! Session commands.
//!
//! # Usage
//!
//! ```bash
//! atelier login -e admin@atelier.studio --password '...'
//! atelier whoami
//! atelier refresh
//! atelier keepalive
//! atelier logout
//! ```
//!
//! # Environment Variables
//!
//! - `ATELIER_PASSWORD` - Password for `login` when `--password` is omitted

use std::time::Duration;

use atelier_client::{AuthError, ClientState};
use serde_json::json;

use super::{CommandError, print_json, require_session};

/// Sign in and persist the tokens.
pub async fn login(
    state: &ClientState,
    email: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let password = password
        .or_else(|| std::env::var("ATELIER_PASSWORD").ok())
        .filter(|p| !p.is_empty())
        .ok_or(CommandError::MissingPassword)?;

    let user = state.session().login(email, &password).await?;
    // The process exits right after; the stored tokens carry the session.
    state.session().stop_refresh();
    print_json(&user)
}

/// Sign out. Always succeeds locally, even if the backend is unreachable.
pub async fn logout(state: &ClientState) -> Result<(), CommandError> {
    state.session().logout().await;
    print_json(&json!({ "state": state.session().state() }))
}

/// Print the signed-in user.
pub async fn whoami(state: &ClientState) -> Result<(), CommandError> {
    require_session(state).await?;
    state.session().stop_refresh();
    let user = state.session().current_user().ok_or(CommandError::NotSignedIn)?;
    print_json(&user)
}

/// Rotate the token pair once.
pub async fn refresh(state: &ClientState) -> Result<(), CommandError> {
    state.session().refresh_token().await?;
    print_json(&json!({ "refreshed": true }))
}

/// Restore the session and let the background task refresh it until Ctrl+C.
pub async fn keepalive(state: &ClientState) -> Result<(), CommandError> {
    require_session(state).await?;
    let interval = state.config().refresh_interval;
    tracing::info!(interval_secs = interval.as_secs(), "keeping session alive");
    print_json(&json!({
        "state": state.session().state(),
        "refreshIntervalSecs": interval.as_secs(),
    }))?;

    let mut check = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            _ = check.tick() => {
                if !state.session().is_authenticated() {
                    return Err(AuthError::SessionExpired.into());
                }
            }
        }
    }

    state.session().stop_refresh();
    print_json(&json!({ "state": state.session().state() }))
}
