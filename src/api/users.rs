//! User registration.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::db::models::{CreateUserRequest, UserResponse};
use crate::services;
use crate::AppState;

/// Register a new account. Only open while the event is active.
///
/// POST /users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    if request.email.is_empty() || !request.email.contains('@') {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    if request.password.len() < 6 {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }

    let user =
        services::auth::register(state.store.as_ref(), &request.email, &request.password).await?;

    Ok((StatusCode::CREATED, Json(user)))
}
