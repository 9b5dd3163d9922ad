//! Activity log commands.

use atelier_client::ClientState;
use atelier_core::ActivityLogQuery;

use super::{CommandError, print_json, require_session};

pub async fn list(
    state: &ClientState,
    page: Option<u32>,
    limit: Option<u32>,
    action: Option<String>,
) -> Result<(), CommandError> {
    require_session(state).await?;
    let query = ActivityLogQuery {
        page,
        limit,
        action,
    };
    print_json(&state.activity_logs().list(&query).await?)
}
