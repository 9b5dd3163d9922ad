//! Client state shared by every consumer.
//!
//! One `ClientState` per process: it owns the token store, the API client
//! and the session, and hands out resource services borrowing them.

use std::sync::Arc;

use crate::api::{ApiClient, ApiResult};
use crate::config::{ClientConfig, TokenStorage};
use crate::services::{ActivityLogService, BlogService, ProjectService, UploadService, UserService};
use crate::session::SessionManager;
use crate::token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Client state. Cheap to clone.
#[derive(Clone)]
pub struct ClientState {
    inner: Arc<ClientStateInner>,
}

struct ClientStateInner {
    config: ClientConfig,
    api: ApiClient,
    session: SessionManager,
}

impl std::fmt::Debug for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientState")
            .field("config", &self.inner.config)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl ClientState {
    /// Build the client with the token store selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Setup`](crate::api::ApiError::Setup) if the HTTP
    /// client cannot be built.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let tokens: Arc<dyn TokenStore> = match &config.token_storage {
            TokenStorage::File(path) => Arc::new(FileTokenStore::new(path)),
            TokenStorage::Memory => Arc::new(MemoryTokenStore::new()),
        };
        Self::with_token_store(config, tokens)
    }

    /// Build the client around an existing token store.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Setup`](crate::api::ApiError::Setup) if the HTTP
    /// client cannot be built.
    pub fn with_token_store(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        crate::logging::set_mode(config.mode);

        let api = ApiClient::new(config.api_url.clone(), Arc::clone(&tokens))?;
        let session = SessionManager::new(api.clone(), tokens, config.refresh_interval);

        Ok(Self {
            inner: Arc::new(ClientStateInner {
                config,
                api,
                session,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    #[must_use]
    pub fn projects(&self) -> ProjectService<'_> {
        ProjectService::new(&self.inner.api)
    }

    #[must_use]
    pub fn blogs(&self) -> BlogService<'_> {
        BlogService::new(&self.inner.api)
    }

    #[must_use]
    pub fn users(&self) -> UserService<'_> {
        UserService::new(&self.inner.api)
    }

    #[must_use]
    pub fn activity_logs(&self) -> ActivityLogService<'_> {
        ActivityLogService::new(&self.inner.api)
    }

    #[must_use]
    pub fn uploads(&self) -> UploadService<'_> {
        UploadService::new(&self.inner.api)
    }
}
