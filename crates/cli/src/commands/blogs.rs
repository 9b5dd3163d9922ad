//! Blog commands.

use atelier_client::{ClientState, ListView};
use atelier_core::{BlogPost, BlogPostId};
use serde_json::json;

use super::{CommandError, print_json};

/// Fetch all posts once and print those matching the filter.
pub async fn list(
    state: &ClientState,
    search: Option<String>,
    category: Option<String>,
) -> Result<(), CommandError> {
    let blogs = state.blogs();
    let mut view: ListView<BlogPost> = ListView::new();
    view.load(|| blogs.list()).await?;
    view.set_search(search.unwrap_or_default());
    view.set_category(category);

    print_json(&json!({
        "categories": view.categories(),
        "posts": view.visible(),
    }))
}

/// Print a post and count the read.
///
/// A failed view count does not fail the command.
pub async fn show(state: &ClientState, id: &str) -> Result<(), CommandError> {
    let id = BlogPostId::new(id);
    let post = state.blogs().get(&id).await?;
    if let Err(e) = state.blogs().record_view(&id).await {
        atelier_client::logging::diagnostic("could not record view", &e);
    }
    let minutes = post.reading_time_minutes();
    print_json(&json!({
        "post": post,
        "readingTimeMinutes": minutes,
    }))
}

pub async fn categories(state: &ClientState) -> Result<(), CommandError> {
    print_json(&state.blogs().categories().await?)
}

pub async fn tags(state: &ClientState) -> Result<(), CommandError> {
    print_json(&state.blogs().tags().await?)
}
