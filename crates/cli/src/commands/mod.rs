//! Command implementations.

pub mod blogs;
pub mod logs;
pub mod projects;
pub mod session;
pub mod upload;
pub mod users;

use std::io::Write;

use atelier_client::{ApiError, AuthError, ClientState, SessionState};
use serde::Serialize;
use thiserror::Error;

/// Errors reported by commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Not signed in. Run `atelier login` first.")]
    NotSignedIn,

    #[error("No password given. Pass --password or set ATELIER_PASSWORD.")]
    MissingPassword,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Could not write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Could not encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Print `value` to stdout as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CommandError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Restore the stored session, failing if nobody is signed in.
pub async fn require_session(state: &ClientState) -> Result<(), CommandError> {
    match state.session().check_auth().await {
        SessionState::Authenticated => Ok(()),
        _ => Err(CommandError::NotSignedIn),
    }
}
