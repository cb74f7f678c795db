//! HTTP client wrapper for the remote church API.
//!
//! Thin layer over reqwest: it knows the base URL, the endpoint paths, and
//! the response envelopes, and nothing else. All calls return [`ApiError`].

pub mod error;

pub use error::ApiError;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::models::{Event, GalleryImage, Pastor, Sermon, Visitor};

/// Current version from Cargo.toml
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct SermonsResponse {
    #[serde(default)]
    sermons: Vec<Sermon>,
}

#[derive(Debug, Deserialize)]
struct GalleryResponse {
    #[serde(default)]
    gallery: Vec<GalleryImage>,
}

#[derive(Debug, Deserialize)]
struct PastorsResponse {
    #[serde(default)]
    pastors: Vec<Pastor>,
}

#[derive(Debug, Deserialize)]
struct VisitorResponse {
    visitor: Option<Visitor>,
}

impl ApiClient {
    /// Create a new API client against the given base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(format!("steeple/{}", CURRENT_VERSION))
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.http.get(self.url(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
        response.json().await.map_err(|e| {
            if e.is_decode() {
                ApiError::Payload(e.to_string())
            } else {
                ApiError::Transport(e)
            }
        })
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        let body: EventsResponse = self.get_json("/api/events/all").await?;
        Ok(body.events)
    }

    pub async fn list_sermons(&self) -> Result<Vec<Sermon>, ApiError> {
        let body: SermonsResponse = self.get_json("/api/sermons/all").await?;
        Ok(body.sermons)
    }

    pub async fn list_gallery(&self) -> Result<Vec<GalleryImage>, ApiError> {
        let body: GalleryResponse = self.get_json("/api/gallery/all").await?;
        Ok(body.gallery)
    }

    pub async fn list_pastors(&self) -> Result<Vec<Pastor>, ApiError> {
        let body: PastorsResponse = self.get_json("/api/pastors/all").await?;
        Ok(body.pastors)
    }

    /// Create a visitor for this uuid, or retrieve the existing one. The
    /// server answers 200 for returning visitors and 201 for new ones.
    pub async fn create_visitor(&self, uuid: &str) -> Result<Visitor, ApiError> {
        let response = self
            .http
            .post(self.url("/api/news-letter/new/visitor"))
            .json(&serde_json::json!({ "uuid": uuid }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let body: VisitorResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                ApiError::Payload(e.to_string())
            } else {
                ApiError::Transport(e)
            }
        })?;

        body.visitor
            .ok_or_else(|| ApiError::Payload("response missing visitor".to_string()))
    }

    /// Fetch the visitor profile for a known identifier.
    pub async fn get_visitor(&self, uuid: &str) -> Result<Visitor, ApiError> {
        let body: VisitorResponse = self
            .get_json(&format!("/api/news-letter/visitor/{}", uuid))
            .await?;

        body.visitor
            .ok_or_else(|| ApiError::Payload("response missing visitor".to_string()))
    }

    /// Subscribe an email address to the newsletter. The endpoint expects a
    /// form-encoded body and answers 201 on success.
    pub async fn register_newsletter(&self, email: &str, uuid: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("/api/news-letter/register"))
            .form(&[("email", email), ("uuid", uuid)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        Ok(())
    }
}
