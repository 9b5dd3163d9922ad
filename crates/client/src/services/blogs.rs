//! Blog posts, categories and tags (`/blogs`).

use atelier_core::{
    BlogPost, BlogPostDraft, BlogPostId, Category, CategoryDraft, CategoryId, ListPayload, Tag,
    TagDraft, TagId,
};
use serde_json::Value;
use tracing::instrument;

use super::resource_path;
use crate::api::{ApiClient, ApiResult};

const BLOGS: &str = "/blogs";
const CATEGORIES: &str = "/blogs/categories";
const TAGS: &str = "/blogs/tags";

/// Blog reader and blog administration.
#[derive(Debug, Clone, Copy)]
pub struct BlogService<'a> {
    api: &'a ApiClient,
}

impl<'a> BlogService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// All posts visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns the sanitized [`ApiError`](crate::api::ApiError) of the call.
    #[instrument(skip(self))]
    pub async fn list(&self) -> ApiResult<Vec<BlogPost>> {
        self.api
            .get::<ListPayload<BlogPost>>(BLOGS)
            .await
            .map(ListPayload::into_items)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`](crate::api::ApiError::NotFound) for an unknown id.
    #[instrument(skip(self, id), fields(post_id = %id))]
    pub async fn get(&self, id: &BlogPostId) -> ApiResult<BlogPost> {
        self.api.get(&resource_path(BLOGS, id.as_str())).await
    }

    /// Count one view of a post.
    ///
    /// # Errors
    ///
    /// Returns the sanitized [`ApiError`](crate::api::ApiError) of the call.
    #[instrument(skip(self, id), fields(post_id = %id))]
    pub async fn record_view(&self, id: &BlogPostId) -> ApiResult<()> {
        let path = format!("{}/view", resource_path(BLOGS, id.as_str()));
        self.api
            .post::<Value, _>(&path, &serde_json::json!({}))
            .await
            .map(drop)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`](crate::api::ApiError::Invalid) without a
    /// request if the draft is incomplete.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: &BlogPostDraft) -> ApiResult<BlogPost> {
        draft.validate()?;
        self.api.post(BLOGS, draft).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`](crate::api::ApiError::Invalid) without a
    /// request if the draft is incomplete.
    #[instrument(skip(self, id, draft), fields(post_id = %id))]
    pub async fn update(&self, id: &BlogPostId, draft: &BlogPostDraft) -> ApiResult<BlogPost> {
        draft.validate()?;
        self.api.put(&resource_path(BLOGS, id.as_str()), draft).await
    }

    /// # Errors
    ///
    /// Returns the sanitized [`ApiError`](crate::api::ApiError) of the call.
    #[instrument(skip(self, id), fields(post_id = %id))]
    pub async fn delete(&self, id: &BlogPostId) -> ApiResult<()> {
        self.api
            .delete::<Value>(&resource_path(BLOGS, id.as_str()))
            .await
            .map(drop)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns the sanitized [`ApiError`](crate::api::ApiError) of the call.
    pub async fn categories(&self) -> ApiResult<Vec<Category>> {
        self.api
            .get::<ListPayload<Category>>(CATEGORIES)
            .await
            .map(ListPayload::into_items)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`](crate::api::ApiError::Invalid) for a blank name.
    #[instrument(skip(self))]
    pub async fn create_category(&self, draft: &CategoryDraft) -> ApiResult<Category> {
        draft.validate()?;
        self.api.post(CATEGORIES, draft).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`](crate::api::ApiError::Invalid) for a blank name.
    #[instrument(skip(self, id), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: &CategoryId,
        draft: &CategoryDraft,
    ) -> ApiResult<Category> {
        draft.validate()?;
        self.api
            .put(&resource_path(CATEGORIES, id.as_str()), draft)
            .await
    }

    /// # Errors
    ///
    /// Returns the sanitized [`ApiError`](crate::api::ApiError) of the call.
    #[instrument(skip(self, id), fields(category_id = %id))]
    pub async fn delete_category(&self, id: &CategoryId) -> ApiResult<()> {
        self.api
            .delete::<Value>(&resource_path(CATEGORIES, id.as_str()))
            .await
            .map(drop)
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// # Errors
    ///
    /// Returns the sanitized [`ApiError`](crate::api::ApiError) of the call.
    pub async fn tags(&self) -> ApiResult<Vec<Tag>> {
        self.api
            .get::<ListPayload<Tag>>(TAGS)
            .await
            .map(ListPayload::into_items)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`](crate::api::ApiError::Invalid) for a blank name.
    #[instrument(skip(self))]
    pub async fn create_tag(&self, draft: &TagDraft) -> ApiResult<Tag> {
        draft.validate()?;
        self.api.post(TAGS, draft).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`](crate::api::ApiError::Invalid) for a blank name.
    #[instrument(skip(self, id), fields(tag_id = %id))]
    pub async fn update_tag(&self, id: &TagId, draft: &TagDraft) -> ApiResult<Tag> {
        draft.validate()?;
        self.api.put(&resource_path(TAGS, id.as_str()), draft).await
    }

    /// # Errors
    ///
    /// Returns the sanitized [`ApiError`](crate::api::ApiError) of the call.
    #[instrument(skip(self, id), fields(tag_id = %id))]
    pub async fn delete_tag(&self, id: &TagId) -> ApiResult<()> {
        self.api
            .delete::<Value>(&resource_path(TAGS, id.as_str()))
            .await
            .map(drop)
    }
}
