pub mod auth;
mod error;
mod events;
mod hotels;
mod users;

pub use error::ApiError;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Sign-in routes (public)
    let auth_routes = Router::new()
        .route("/sign-in", post(auth::sign_in))
        .route("/github/sign-in", post(auth::sign_in_github));

    // Hotel routes authenticate through the AuthUser extractor
    Router::new()
        .route("/health", get(health_check))
        .route("/users", post(users::create_user))
        .route("/event", get(events::get_event))
        .route("/hotels", get(hotels::list_hotels))
        .route("/hotels/:hotel_id", get(hotels::get_hotel))
        .nest("/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
