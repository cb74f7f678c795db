//! Wire models for the remote church API.
//!
//! The API serves MongoDB-shaped documents: `_id` identifiers and camelCase
//! field names. Optional fields default leniently so a sparse document never
//! fails a whole collection fetch.

use serde::{Deserialize, Serialize};

/// Uploaded image reference as stored by the API's media service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub public_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    General,
    Service,
    Youth,
    Community,
}

impl Default for EventCategory {
    fn default() -> Self {
        EventCategory::General
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub category: EventCategory,
    #[serde(default)]
    pub thumbnail: ImageRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sermon {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub speaker: String,
    pub date: String,
    pub description: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub scripture: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub is_live: Option<bool>,
    /// Visitor identifiers that liked this sermon
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub thumbnail: ImageRef,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryCategory {
    General,
    Events,
    Worship,
    Community,
}

impl Default for GalleryCategory {
    fn default() -> Self {
        GalleryCategory::General
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub image_url: String,
    #[serde(default)]
    pub category: GalleryCategory,
    #[serde(default)]
    pub image: ImageRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pastor {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub title: String,
    pub bio: String,
    #[serde(default)]
    pub profile_img: ImageRef,
    pub email: String,
    #[serde(default)]
    pub is_lead: bool,
    /// Display order on the about page
    #[serde(default)]
    pub order: i32,
    /// Convenience copy of the profile image URL
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BanStatus {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub reason: String,
}

/// Anonymous browser-tracked identity, distinct from the admin user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    #[serde(rename = "_id")]
    pub id: String,
    pub uuid: String,
    #[serde(default)]
    pub profile_image: ImageRef,
    /// Opaque reminder documents; this client never inspects them
    #[serde(default)]
    pub reminders: Vec<serde_json::Value>,
    #[serde(default)]
    pub banned: BanStatus,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub email: String,
}

/// The locally persisted admin session. The role is trusted at face value;
/// no server ever vouches for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub role: String,
}
