//! Project commands.

use atelier_client::{ClientState, ListView};
use atelier_core::{Project, ProjectId};
use serde_json::json;

use super::{CommandError, print_json, require_session};

/// Fetch all projects once, filter locally and print one page.
pub async fn list(
    state: &ClientState,
    search: Option<String>,
    category: Option<String>,
    page: usize,
    per_page: usize,
) -> Result<(), CommandError> {
    let projects = state.projects();
    let mut view: ListView<Project> = ListView::new();
    view.load(|| projects.list()).await?;
    view.set_search(search.unwrap_or_default());
    view.set_category(category);

    print_json(&json!({
        "categories": view.categories(),
        "page": view.page(page, per_page),
    }))
}

pub async fn show(state: &ClientState, id: &str) -> Result<(), CommandError> {
    let project = state.projects().get(&ProjectId::new(id)).await?;
    print_json(&project)
}

pub async fn delete(state: &ClientState, id: &str) -> Result<(), CommandError> {
    require_session(state).await?;
    state.projects().delete(&ProjectId::new(id)).await?;
    tracing::info!(project_id = %id, "project deleted");
    print_json(&json!({ "deleted": id }))
}
