//! Event metadata, served cache-aside.

use chrono::{DateTime, Utc};

use crate::cache::CacheStore;
use crate::db::models::EventResponse;
use crate::db::CredentialStore;
use crate::services::ServiceError;

pub const EVENT_CACHE_KEY: &str = "firstEvent";

/// First (assumed only) event, without audit timestamps. Cache hit avoids
/// the database entirely; a miss populates the cache with the configured
/// TTL. Concurrent misses may both write; both compute the same value from
/// the same row, so last-write-wins is harmless.
pub async fn get_first_event(
    store: &dyn CredentialStore,
    cache: &dyn CacheStore,
    ttl_seconds: u64,
) -> Result<EventResponse, ServiceError> {
    if let Some(cached) = cache
        .get(EVENT_CACHE_KEY)
        .await
        .map_err(ServiceError::Cache)?
    {
        if let Ok(event) = serde_json::from_str(&cached) {
            return Ok(event);
        }
        // Corrupt entry: fall through and rebuild it from the store.
        tracing::warn!("Discarding undeserializable cache entry for {}", EVENT_CACHE_KEY);
    }

    let event = store
        .find_first_event()
        .await?
        .ok_or(ServiceError::NotFound("event"))?;
    let response = EventResponse::from(event);

    let payload = serde_json::to_string(&response)?;
    cache
        .set(EVENT_CACHE_KEY, &payload, Some(ttl_seconds))
        .await
        .map_err(ServiceError::Cache)?;

    Ok(response)
}

/// Whether "now" falls strictly inside the event window. Never errors:
/// a missing event, a store failure, or unparsable timestamps all read as
/// "not active". Always re-derives from the store; event rows are immutable
/// after seeding, so skipping the cache cannot go stale.
pub async fn is_current_event_active(store: &dyn CredentialStore) -> bool {
    let event = match store.find_first_event().await {
        Ok(Some(event)) => event,
        _ => return false,
    };

    let (Ok(starts_at), Ok(ends_at)) = (
        DateTime::parse_from_rfc3339(&event.starts_at),
        DateTime::parse_from_rfc3339(&event.ends_at),
    ) else {
        return false;
    };

    let now = Utc::now();
    now > starts_at.with_timezone(&Utc) && now < ends_at.with_timezone(&Utc)
}
