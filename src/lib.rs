pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod github;
pub mod services;

pub use db::DbPool;

use std::sync::Arc;

use cache::CacheStore;
use config::Config;
use db::CredentialStore;
use github::OAuthProvider;

/// Shared application state: read-only configuration plus the external
/// store clients. Everything request handlers need hangs off this.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn CredentialStore>,
    pub cache: Arc<dyn CacheStore>,
    /// None when GitHub OAuth credentials are not configured; the GitHub
    /// sign-in endpoint then answers 503.
    pub github: Option<Arc<dyn OAuthProvider>>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn CredentialStore>,
        cache: Arc<dyn CacheStore>,
        github: Option<Arc<dyn OAuthProvider>>,
    ) -> Self {
        Self {
            config,
            store,
            cache,
            github,
        }
    }
}
