//! Hotel and room models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub capacity: i64,
    pub hotel_id: i64,
}

/// A hotel with its rooms nested, the shape served by the browsing endpoints
/// and stored in the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelWithRooms {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub rooms: Vec<Room>,
}
