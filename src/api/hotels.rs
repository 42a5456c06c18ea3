//! Hotel browsing endpoints. Both require a signed-in user holding a PAID,
//! in-person, hotel-inclusive ticket.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::db::models::HotelWithRooms;
use crate::services;
use crate::AppState;

/// All hotels with their rooms.
///
/// GET /hotels
pub async fn list_hotels(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<HotelWithRooms>>, ApiError> {
    let hotels = services::hotels::get_hotels(
        state.store.as_ref(),
        state.cache.as_ref(),
        state.config.cache.ttl_seconds,
        user.user_id,
    )
    .await?;
    Ok(Json(hotels))
}

/// One hotel with its rooms.
///
/// GET /hotels/:hotelId
pub async fn get_hotel(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(hotel_id): Path<String>,
) -> Result<Json<HotelWithRooms>, ApiError> {
    // Non-numeric path values funnel in as 0, which the service rejects as
    // invalid data rather than a lookup miss.
    let hotel_id: i64 = hotel_id.parse().unwrap_or(0);

    let hotel =
        services::hotels::get_hotels_with_rooms(state.store.as_ref(), user.user_id, hotel_id)
            .await?;
    Ok(Json(hotel))
}
