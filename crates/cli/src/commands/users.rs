//! Back-office user commands.

use atelier_client::ClientState;
use atelier_core::UserId;
use serde_json::json;

use super::{CommandError, print_json, require_session};

pub async fn list(state: &ClientState) -> Result<(), CommandError> {
    require_session(state).await?;
    print_json(&state.users().list().await?)
}

pub async fn delete(state: &ClientState, id: &str) -> Result<(), CommandError> {
    require_session(state).await?;
    state.users().delete(&UserId::new(id)).await?;
    tracing::info!(user_id = %id, "user deleted");
    print_json(&json!({ "deleted": id }))
}
