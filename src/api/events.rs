//! Event metadata endpoint.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::db::models::EventResponse;
use crate::services;
use crate::AppState;

/// The current event, without audit timestamps. Served cache-aside.
///
/// GET /event
pub async fn get_event(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = services::events::get_first_event(
        state.store.as_ref(),
        state.cache.as_ref(),
        state.config.cache.ttl_seconds,
    )
    .await?;
    Ok(Json(event))
}
