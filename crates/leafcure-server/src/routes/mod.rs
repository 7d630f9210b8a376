//! HTTP routes.

mod chat;
mod status;

pub use chat::{ChatRequest, ChatResponse};
pub use status::{HealthResponse, ReloadError};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/health", get(status::health))
        .route("/reload", post(status::reload))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
