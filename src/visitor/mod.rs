//! Visitor identity manager.
//!
//! Every browser-equivalent installation gets one persistent uuid. On
//! startup the uuid is read from the store (or generated once), registered
//! with the remote API, and kept for periodic profile refreshes. Failed
//! registration is retried with a linearly growing delay, reusing the same
//! uuid across every attempt; only a successful registration of a freshly
//! generated uuid writes it to the store.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::models::Visitor;
use crate::store::{LocalStore, VISITOR_ID_KEY};
use crate::LivenessFlag;

/// Default number of retries after the first failed registration attempt
const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay between registration retries
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

const CREATE_FALLBACK: &str = "Failed to create/retrieve visitor profile";
const REFRESH_FALLBACK: &str = "Failed to refresh visitor profile";

/// Shared visitor state
#[derive(Debug)]
pub struct VisitorState {
    pub visitor: Option<Visitor>,
    pub visitor_id: Option<String>,
    pub last_error: Option<String>,
    pub loading: bool,
}

impl Default for VisitorState {
    fn default() -> Self {
        Self {
            visitor: None,
            visitor_id: None,
            last_error: None,
            // Loading until initialization settles
            loading: true,
        }
    }
}

pub struct VisitorManager {
    api: Arc<ApiClient>,
    store: LocalStore,
    state: Arc<RwLock<VisitorState>>,
    max_retries: u32,
    retry_delay: Duration,
}

impl VisitorManager {
    pub fn new(api: Arc<ApiClient>, store: LocalStore) -> Self {
        Self::with_retry_policy(api, store, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY)
    }

    /// Create a manager with a custom retry cap and base delay.
    pub fn with_retry_policy(
        api: Arc<ApiClient>,
        store: LocalStore,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            api,
            store,
            state: Arc::new(RwLock::new(VisitorState::default())),
            max_retries,
            retry_delay,
        }
    }

    /// Get the shared state for consumers.
    pub fn state(&self) -> Arc<RwLock<VisitorState>> {
        self.state.clone()
    }

    pub fn visitor(&self) -> Option<Visitor> {
        self.state.read().visitor.clone()
    }

    pub fn visitor_id(&self) -> Option<String> {
        self.state.read().visitor_id.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }

    /// True until `initialize` has settled, successfully or not.
    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    /// Register this installation's visitor with the remote API.
    ///
    /// The uuid is resolved once before the attempt loop and reused across
    /// retries. Attempt *n* failing sleeps `n x retry_delay` before the next
    /// try; after the cap is exhausted the error is surfaced and the visitor
    /// stays absent so callers degrade gracefully.
    pub async fn initialize(&self, active: &LivenessFlag) {
        let stored = match self.store.get(VISITOR_ID_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to read stored visitor id");
                None
            }
        };

        let is_new = stored.is_none();
        let uuid = stored.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mut attempt: u32 = 0;
        loop {
            match self.api.create_visitor(&uuid).await {
                Ok(visitor) => {
                    if !active.is_active() {
                        return;
                    }
                    if is_new {
                        if let Err(e) = self.store.set(VISITOR_ID_KEY, &uuid) {
                            warn!(error = %e, "Failed to persist visitor id");
                        }
                    }
                    info!(new = is_new, "Visitor profile ready");
                    let mut state = self.state.write();
                    state.visitor_id = Some(uuid);
                    state.visitor = Some(visitor);
                    state.last_error = None;
                    state.loading = false;
                    return;
                }
                Err(e) => {
                    attempt += 1;
                    if attempt <= self.max_retries {
                        let delay = self.retry_delay * attempt;
                        warn!(
                            attempt = attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Visitor registration failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        warn!(error = %e, "Visitor registration failed, giving up");
                        if active.is_active() {
                            let mut state = self.state.write();
                            state.last_error = Some(e.user_message(CREATE_FALLBACK));
                            state.loading = false;
                        }
                        return;
                    }
                }
            }
        }
    }

    /// Re-fetch the visitor profile and replace it wholesale. A no-op while
    /// no visitor id is known.
    pub async fn refresh(&self, active: &LivenessFlag) {
        let Some(uuid) = self.visitor_id() else {
            debug!("No visitor id yet, skipping refresh");
            return;
        };

        match self.api.get_visitor(&uuid).await {
            Ok(visitor) => {
                if !active.is_active() {
                    return;
                }
                let mut state = self.state.write();
                state.visitor = Some(visitor);
                state.last_error = None;
            }
            Err(e) => {
                warn!(error = %e, "Visitor refresh failed");
                if active.is_active() {
                    self.state.write().last_error = Some(e.user_message(REFRESH_FALLBACK));
                }
            }
        }
    }
}

/// Spawn the periodic visitor refresh task.
pub fn spawn_refresh_task(
    manager: Arc<VisitorManager>,
    interval_secs: u64,
    active: LivenessFlag,
) {
    info!(interval_secs = interval_secs, "Starting visitor refresh task");

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(interval_secs));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // First tick fires immediately; the profile was just fetched
        tick.tick().await;

        loop {
            tick.tick().await;
            if !active.is_active() {
                break;
            }
            manager.refresh(&active).await;
        }
    });
}
