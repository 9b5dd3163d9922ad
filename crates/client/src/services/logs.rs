//! Activity log (`/admin/logs`).

use atelier_core::{ActivityLog, ActivityLogQuery, ListPayload};
use tracing::instrument;

use crate::api::{ApiClient, ApiRequest, ApiResult};

const LOGS: &str = "/admin/logs";

/// Read-only access to the back-office audit trail.
#[derive(Debug, Clone, Copy)]
pub struct ActivityLogService<'a> {
    api: &'a ApiClient,
}

impl<'a> ActivityLogService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// One page of log entries, newest first as the backend returns them.
    ///
    /// # Errors
    ///
    /// Returns the sanitized [`ApiError`](crate::api::ApiError) of the call.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &ActivityLogQuery) -> ApiResult<Vec<ActivityLog>> {
        let request = ApiRequest::get(LOGS).query(query.to_pairs());
        self.api
            .send::<ListPayload<ActivityLog>>(request)
            .await
            .map(ListPayload::into_items)
    }
}
