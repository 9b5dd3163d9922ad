//! Portfolio projects (`/projects`).

use atelier_core::{ListPayload, Project, ProjectDraft, ProjectId};
use serde_json::Value;
use tracing::instrument;

use super::resource_path;
use crate::api::{ApiClient, ApiResult};

const PROJECTS: &str = "/projects";

/// Project listing for the public site and CRUD for the back-office.
#[derive(Debug, Clone, Copy)]
pub struct ProjectService<'a> {
    api: &'a ApiClient,
}

impl<'a> ProjectService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// All projects, in backend order.
    ///
    /// # Errors
    ///
    /// Returns the sanitized [`ApiError`](crate::api::ApiError) of the call.
    #[instrument(skip(self))]
    pub async fn list(&self) -> ApiResult<Vec<Project>> {
        self.api
            .get::<ListPayload<Project>>(PROJECTS)
            .await
            .map(ListPayload::into_items)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`](crate::api::ApiError::NotFound) for an unknown id.
    #[instrument(skip(self, id), fields(project_id = %id))]
    pub async fn get(&self, id: &ProjectId) -> ApiResult<Project> {
        self.api.get(&resource_path(PROJECTS, id.as_str())).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`](crate::api::ApiError::Invalid) without a
    /// request if the draft is incomplete.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: &ProjectDraft) -> ApiResult<Project> {
        draft.validate()?;
        self.api.post(PROJECTS, draft).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`](crate::api::ApiError::Invalid) without a
    /// request if the draft is incomplete.
    #[instrument(skip(self, id, draft), fields(project_id = %id))]
    pub async fn update(&self, id: &ProjectId, draft: &ProjectDraft) -> ApiResult<Project> {
        draft.validate()?;
        self.api.put(&resource_path(PROJECTS, id.as_str()), draft).await
    }

    /// # Errors
    ///
    /// Returns the sanitized [`ApiError`](crate::api::ApiError) of the call.
    #[instrument(skip(self, id), fields(project_id = %id))]
    pub async fn delete(&self, id: &ProjectId) -> ApiResult<()> {
        self.api
            .delete::<Value>(&resource_path(PROJECTS, id.as_str()))
            .await
            .map(drop)
    }
}
