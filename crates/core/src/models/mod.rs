//! Records exchanged with the REST backend.
//!
//! Field names follow the backend's camelCase JSON. Ids accept both `id` and
//! the document-store style `_id`; missing optional fields deserialize to
//! their defaults so partially populated records still load.

pub mod activity;
pub mod auth;
pub mod blog;
pub mod envelope;
pub mod project;
pub mod upload;
pub mod user;
mod wire;

pub use activity::{ActivityLog, ActivityLogQuery};
pub use auth::{LoginPayload, LoginRequest, ProfilePayload, RefreshRequest, TokenEnvelope, TokenPair};
pub use blog::{BlogPost, BlogPostDraft, Category, CategoryDraft, Tag, TagDraft};
pub use envelope::{ApiResponse, ListPayload};
pub use project::{Project, ProjectDraft};
pub use upload::UploadedFile;
pub use user::{User, UserDraft};
