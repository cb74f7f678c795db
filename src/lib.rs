pub mod api;
pub mod auth;
pub mod config;
pub mod content;
pub mod models;
pub mod store;
pub mod visitor;

pub use store::LocalStore;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use api::{ApiClient, ApiError};
use auth::AuthSession;
use config::Config;
use content::ContentAggregator;
use visitor::VisitorManager;

/// Shared liveness flag for background work.
///
/// In-flight requests are not cancelled on shutdown; instead every task
/// checks this flag after an await point before mutating shared state, so a
/// response racing teardown is simply dropped.
#[derive(Clone)]
pub struct LivenessFlag(Arc<AtomicBool>);

impl LivenessFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn shutdown(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

impl Default for LivenessFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// The application session: every manager the site's views consume, built
/// once at startup and passed by reference. No hidden singletons.
pub struct AppState {
    pub config: Config,
    pub store: LocalStore,
    pub api: Arc<ApiClient>,
    pub auth: AuthSession,
    pub visitor: Arc<VisitorManager>,
    pub content: Arc<ContentAggregator>,
    pub active: LivenessFlag,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = LocalStore::open(&config.storage.data_dir)?;
        let api = Arc::new(ApiClient::new(
            config.api.base_url.clone(),
            Duration::from_secs(config.api.timeout_secs),
        ));
        let auth = AuthSession::new(store.clone(), config.auth.admin_secret.clone());
        let visitor = Arc::new(VisitorManager::with_retry_policy(
            api.clone(),
            store.clone(),
            config.polling.visitor_max_retries,
            Duration::from_millis(config.polling.visitor_retry_delay_ms),
        ));
        let content = Arc::new(ContentAggregator::with_interval(
            api.clone(),
            config.polling.content_interval_secs,
        ));

        Ok(Self {
            config,
            store,
            api,
            auth,
            visitor,
            content,
            active: LivenessFlag::new(),
        })
    }

    /// Subscribe an email address to the newsletter, using the persistent
    /// visitor uuid (generating and storing one if none exists yet, the way
    /// the signup form does).
    pub async fn subscribe_newsletter(&self, email: &str) -> Result<(), ApiError> {
        let uuid = match self.store.get(store::VISITOR_ID_KEY) {
            Ok(Some(uuid)) => uuid,
            Ok(None) => {
                let uuid = uuid::Uuid::new_v4().to_string();
                if let Err(e) = self.store.set(store::VISITOR_ID_KEY, &uuid) {
                    warn!(error = %e, "Failed to persist visitor id");
                }
                uuid
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored visitor id");
                uuid::Uuid::new_v4().to_string()
            }
        };

        self.api.register_newsletter(email, &uuid).await
    }
}
