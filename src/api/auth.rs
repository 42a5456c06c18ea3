//! Sign-in endpoints and the authenticated-user extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::request::Parts,
    Json,
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::db::models::{GithubSignInRequest, SignInRequest, SignInResponse};
use crate::services;
use crate::AppState;

/// Password sign-in.
///
/// POST /auth/sign-in
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, ApiError> {
    if request.email.is_empty() || !request.email.contains('@') {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    if request.password.is_empty() {
        return Err(ApiError::bad_request("Password is required"));
    }

    let result = services::auth::sign_in(
        state.store.as_ref(),
        &state.config.auth,
        &request.email,
        &request.password,
    )
    .await?;

    Ok(Json(result))
}

/// GitHub OAuth sign-in: the client sends the authorization code from the
/// callback redirect.
///
/// POST /auth/github/sign-in
pub async fn sign_in_github(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GithubSignInRequest>,
) -> Result<Json<SignInResponse>, ApiError> {
    let provider = state
        .github
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("GitHub sign-in is not configured"))?;

    if request.code.is_empty() {
        return Err(ApiError::bad_request("Authorization code is required"));
    }

    let result = services::auth::sign_in_github(
        state.store.as_ref(),
        &state.config.auth,
        provider.as_ref(),
        &request.code,
    )
    .await?;

    Ok(Json(result))
}

/// Extract the bearer token from request headers
fn extract_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// The requesting user, resolved from a bearer token. The token must decode
/// against the signing secret and match a persisted session row.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        let claims = services::auth::decode_token(&state.config.auth, token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        let session = state.store.find_session_by_token(token).await.map_err(|e| {
            tracing::error!("Session lookup failed: {}", e);
            ApiError::database("A database error occurred")
        })?;
        if session.is_none() {
            return Err(ApiError::unauthorized("Session not found"));
        }

        Ok(AuthUser {
            user_id: claims.user_id,
        })
    }
}
