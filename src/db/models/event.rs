//! Event model. A single active event row is assumed; it is immutable after
//! seeding except through an external admin process.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub logo_image_url: String,
    pub background_image_url: String,
    /// RFC 3339 timestamps, stored as TEXT.
    pub starts_at: String,
    pub ends_at: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Event projection without audit timestamps. This is both the API shape and
/// the cached payload, so a cache hit and a fresh read serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: i64,
    pub title: String,
    pub logo_image_url: String,
    pub background_image_url: String,
    pub starts_at: String,
    pub ends_at: String,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            logo_image_url: event.logo_image_url,
            background_image_url: event.background_image_url,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
        }
    }
}
