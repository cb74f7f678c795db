//! Polling content aggregator.
//!
//! Fetches the four site collections (events, sermons, gallery, pastors) in
//! parallel on a fixed interval and replaces local state wholesale on each
//! successful round. The four calls form one all-or-nothing unit: a single
//! failure discards the entire round and surfaces an error instead.
//!
//! Overlapping rounds are not sequenced; a slow response can be overtaken by
//! a later one and the last write wins. Freshness lag is bounded by the
//! interval.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::models::{Event, GalleryImage, Pastor, Sermon};
use crate::LivenessFlag;

/// Default interval between content refresh cycles (in seconds)
const DEFAULT_CONTENT_INTERVAL_SECS: u64 = 5;

const LOAD_FALLBACK: &str = "Failed to load data";

/// Shared content state
#[derive(Debug)]
pub struct ContentState {
    pub events: Vec<Event>,
    pub sermons: Vec<Sermon>,
    pub gallery: Vec<GalleryImage>,
    pub pastors: Vec<Pastor>,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl Default for ContentState {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            sermons: Vec::new(),
            gallery: Vec::new(),
            pastors: Vec::new(),
            // Loading until the first round settles
            loading: true,
            last_error: None,
        }
    }
}

pub struct ContentAggregator {
    api: Arc<ApiClient>,
    state: Arc<RwLock<ContentState>>,
    interval_secs: u64,
}

impl ContentAggregator {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self::with_interval(api, DEFAULT_CONTENT_INTERVAL_SECS)
    }

    /// Create an aggregator with a custom polling interval.
    pub fn with_interval(api: Arc<ApiClient>, interval_secs: u64) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(ContentState::default())),
            interval_secs,
        }
    }

    /// Get the shared state for consumers.
    pub fn state(&self) -> Arc<RwLock<ContentState>> {
        self.state.clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.read().events.clone()
    }

    pub fn sermons(&self) -> Vec<Sermon> {
        self.state.read().sermons.clone()
    }

    pub fn gallery(&self) -> Vec<GalleryImage> {
        self.state.read().gallery.clone()
    }

    pub fn pastors(&self) -> Vec<Pastor> {
        self.state.read().pastors.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }

    /// Run one refresh round: issue the four collection fetches concurrently
    /// and wait for all of them to settle. On full success all four
    /// collections are replaced under a single write lock; on any failure
    /// nothing is committed and the error is recorded.
    pub async fn refresh(&self, active: &LivenessFlag) {
        if !active.is_active() {
            return;
        }

        {
            let mut state = self.state.write();
            state.loading = true;
            state.last_error = None;
        }

        let result = tokio::try_join!(
            self.api.list_events(),
            self.api.list_sermons(),
            self.api.list_gallery(),
            self.api.list_pastors(),
        );

        if !active.is_active() {
            return;
        }

        match result {
            Ok((events, sermons, gallery, pastors)) => {
                debug!(
                    events = events.len(),
                    sermons = sermons.len(),
                    gallery = gallery.len(),
                    pastors = pastors.len(),
                    "Content refresh completed"
                );
                let mut state = self.state.write();
                state.events = events;
                state.sermons = sermons;
                state.gallery = gallery;
                state.pastors = pastors;
                state.loading = false;
                state.last_error = None;
            }
            Err(e) => {
                warn!(error = %e, "Content refresh failed");
                let mut state = self.state.write();
                state.loading = false;
                state.last_error = Some(e.user_message(LOAD_FALLBACK));
            }
        }
    }
}

/// Spawn the background content polling task.
pub fn spawn_content_task(aggregator: Arc<ContentAggregator>, active: LivenessFlag) {
    info!(
        interval_secs = aggregator.interval_secs,
        "Starting content polling task"
    );

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(aggregator.interval_secs));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick.tick().await;
            if !active.is_active() {
                break;
            }
            aggregator.refresh(&active).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn aggregator(server: &MockServer) -> ContentAggregator {
        let api = Arc::new(ApiClient::new(server.uri(), Duration::from_secs(5)));
        ContentAggregator::new(api)
    }

    fn event(id: &str) -> serde_json::Value {
        serde_json::json!({
            "_id": id,
            "title": "Youth Night",
            "description": "Friday youth service",
            "date": "2026-09-04",
            "time": "18:30",
            "location": "Youth Hall",
            "category": "youth"
        })
    }

    fn gallery_image(id: &str) -> serde_json::Value {
        serde_json::json!({
            "_id": id,
            "title": "Worship moment",
            "imageUrl": "https://cdn.example/w.jpg",
            "category": "worship"
        })
    }

    fn pastor(id: &str) -> serde_json::Value {
        serde_json::json!({
            "_id": id,
            "name": "Rev. Mensah",
            "title": "Lead Pastor",
            "bio": "Serving since 2009",
            "email": "pastor@example.org",
            "isLead": true,
            "order": 1
        })
    }

    async fn mount_all_success(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/events/all"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "events": [event("e1")] })),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/sermons/all"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "sermons": [] })),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/gallery/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({ "gallery": [gallery_image("g1"), gallery_image("g2")] }),
            ))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/pastors/all"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "pastors": [pastor("p1")] })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_full_success_commits_all_four_collections() {
        let server = MockServer::start().await;
        mount_all_success(&server).await;

        let aggregator = aggregator(&server);
        assert!(aggregator.is_loading());

        aggregator.refresh(&LivenessFlag::new()).await;

        assert_eq!(aggregator.events().len(), 1);
        assert_eq!(aggregator.events()[0].id, "e1");
        assert!(aggregator.sermons().is_empty());
        assert_eq!(aggregator.gallery().len(), 2);
        assert_eq!(aggregator.pastors().len(), 1);
        assert!(!aggregator.is_loading());
        assert!(aggregator.last_error().is_none());
    }

    #[tokio::test]
    async fn test_single_failure_discards_whole_round() {
        let server = MockServer::start().await;
        mount_all_success(&server).await;

        let aggregator = aggregator(&server);
        let active = LivenessFlag::new();
        aggregator.refresh(&active).await;
        assert_eq!(aggregator.events().len(), 1);

        // Second round: events fails, the other three still succeed.
        // Mocks match in mount order, so the failure goes in first.
        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/api/events/all"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(serde_json::json!({ "message": "events offline" })),
            )
            .mount(&server)
            .await;
        mount_all_success(&server).await;

        aggregator.refresh(&active).await;

        // Nothing from the failed round was committed
        assert_eq!(aggregator.events().len(), 1);
        assert_eq!(aggregator.gallery().len(), 2);
        assert_eq!(aggregator.pastors().len(), 1);
        assert_eq!(aggregator.last_error().as_deref(), Some("events offline"));
        assert!(!aggregator.is_loading());
    }

    #[tokio::test]
    async fn test_failure_without_message_uses_generic_fallback() {
        let server = MockServer::start().await;
        // Nothing mounted: every request 404s with an empty body
        let aggregator = aggregator(&server);
        aggregator.refresh(&LivenessFlag::new()).await;

        assert_eq!(aggregator.last_error().as_deref(), Some("Failed to load data"));
        assert!(aggregator.events().is_empty());
    }

    #[tokio::test]
    async fn test_successful_round_clears_previous_error() {
        let server = MockServer::start().await;
        let aggregator = aggregator(&server);
        let active = LivenessFlag::new();

        // First round fails (no mocks mounted)
        aggregator.refresh(&active).await;
        assert!(aggregator.last_error().is_some());

        mount_all_success(&server).await;
        aggregator.refresh(&active).await;
        assert!(aggregator.last_error().is_none());
        assert_eq!(aggregator.events().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_after_shutdown_commits_nothing() {
        let server = MockServer::start().await;
        mount_all_success(&server).await;

        let aggregator = aggregator(&server);
        let active = LivenessFlag::new();
        active.shutdown();
        aggregator.refresh(&active).await;

        assert!(aggregator.events().is_empty());
        assert!(aggregator.is_loading());
    }

    #[tokio::test]
    async fn test_empty_round_evicts_previous_items() {
        let server = MockServer::start().await;
        mount_all_success(&server).await;

        let aggregator = aggregator(&server);
        let active = LivenessFlag::new();
        aggregator.refresh(&active).await;
        assert_eq!(aggregator.events().len(), 1);

        // All four succeed but events came back empty; wholesale replacement
        // evicts the previously displayed item
        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/api/events/all"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "events": [] })),
            )
            .mount(&server)
            .await;
        mount_all_success(&server).await;

        aggregator.refresh(&active).await;
        assert!(aggregator.events().is_empty());
        assert!(aggregator.last_error().is_none());
    }
}
