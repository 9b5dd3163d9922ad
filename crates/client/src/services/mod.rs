//! Typed wrappers over the backend's resource endpoints.
//!
//! Services borrow an [`ApiClient`](crate::api::ApiClient) and are created
//! per use. Drafts are validated before anything is sent.

mod blogs;
mod logs;
mod projects;
mod uploads;
mod users;

pub use blogs::BlogService;
pub use logs::ActivityLogService;
pub use projects::ProjectService;
pub use uploads::UploadService;
pub use users::UserService;

/// `base/id`, with the id percent-encoded as a single path segment.
fn resource_path(base: &str, id: &str) -> String {
    let mut path = String::from(base);
    path.push('/');
    // byte_serialize escapes a literal '+', so any '+' left stands for a space.
    for chunk in url::form_urlencoded::byte_serialize(id.as_bytes()) {
        path.push_str(&chunk.replace('+', "%20"));
    }
    path
}
