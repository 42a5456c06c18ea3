//! Hotel browsing, gated by the requesting user's ticket entitlement.

use crate::cache::CacheStore;
use crate::db::models::{HotelWithRooms, TicketStatus};
use crate::db::CredentialStore;
use crate::services::ServiceError;

pub const HOTELS_CACHE_KEY: &str = "hotels";

/// Shared precondition: the user must hold a PAID, in-person,
/// hotel-inclusive ticket.
pub async fn validate_user_booking(
    store: &dyn CredentialStore,
    user_id: i64,
) -> Result<(), ServiceError> {
    let enrollment = store
        .find_enrollment_by_user_id(user_id)
        .await?
        .ok_or(ServiceError::NotFound("enrollment"))?;

    let ticket = store
        .find_ticket_by_enrollment_id(enrollment.id)
        .await?
        .ok_or(ServiceError::NotFound("ticket"))?;

    let ticket_type = &ticket.ticket_type;
    if ticket.status == TicketStatus::Reserved
        || ticket_type.is_remote
        || !ticket_type.includes_hotel
    {
        return Err(ServiceError::CannotListHotels);
    }

    Ok(())
}

/// All hotels with their rooms, cache-aside on a single key.
pub async fn get_hotels(
    store: &dyn CredentialStore,
    cache: &dyn CacheStore,
    ttl_seconds: u64,
    user_id: i64,
) -> Result<Vec<HotelWithRooms>, ServiceError> {
    validate_user_booking(store, user_id).await?;

    if let Some(cached) = cache
        .get(HOTELS_CACHE_KEY)
        .await
        .map_err(ServiceError::Cache)?
    {
        if let Ok(hotels) = serde_json::from_str(&cached) {
            return Ok(hotels);
        }
        tracing::warn!("Discarding undeserializable cache entry for {}", HOTELS_CACHE_KEY);
    }

    let hotels = store.find_hotels_with_rooms().await?;
    if hotels.is_empty() {
        return Err(ServiceError::NotFound("hotels"));
    }

    let payload = serde_json::to_string(&hotels)?;
    cache
        .set(HOTELS_CACHE_KEY, &payload, Some(ttl_seconds))
        .await
        .map_err(ServiceError::Cache)?;

    Ok(hotels)
}

/// One hotel with its rooms. Per-hotel lookups bypass the cache. Callers
/// funnel missing or unparsable path ids in as 0, so any non-positive id is
/// invalid data here rather than a lookup miss.
pub async fn get_hotels_with_rooms(
    store: &dyn CredentialStore,
    user_id: i64,
    hotel_id: i64,
) -> Result<HotelWithRooms, ServiceError> {
    validate_user_booking(store, user_id).await?;

    if hotel_id <= 0 {
        return Err(ServiceError::InvalidData("hotelId"));
    }

    store
        .find_hotel_with_rooms(hotel_id)
        .await?
        .ok_or(ServiceError::NotFound("hotel"))
}
