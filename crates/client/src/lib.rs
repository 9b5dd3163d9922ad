//! Atelier Client - session, REST client and list views.
//!
//! Everything the site's public pages and back-office need to talk to the
//! REST backend:
//!
//! - [`token_store`] - Persisted `accessToken` / `refreshToken`
//! - [`api`] - HTTP calls with bearer auth and envelope normalization
//! - [`session`] - Login, logout, profile check and background token refresh
//! - [`services`] - Typed wrappers for projects, blogs, users, logs and uploads
//! - [`views`] - Fetch-once lists with local search and category filtering
//!
//! # Example
//!
//! ```rust,ignore
//! let state = ClientState::new(ClientConfig::from_env()?)?;
//! state.session().check_auth().await;
//!
//! let projects = state.projects();
//! let mut view = ListView::new();
//! view.load(|| projects.list()).await?;
//! view.set_search("laravel");
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod logging;
pub mod services;
pub mod session;
pub mod state;
pub mod token_store;
pub mod views;

pub use api::{ApiClient, ApiError, ApiRequest, ApiResult, IntoApiResponse};
pub use config::{ClientConfig, ConfigError, TokenStorage};
pub use logging::RunMode;
pub use session::{AuthError, SessionManager, SessionState};
pub use state::ClientState;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenKind, TokenStore, TokenStoreError};
pub use views::ListView;
