//! Route table for the studio API

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.settings.server.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/v1/studio",
            get(handlers::get_studio).delete(handlers::reset_studio),
        )
        .route("/v1/person", post(handlers::upload_person))
        .route("/v1/person/:index", delete(handlers::remove_person))
        .route("/v1/outfits", post(handlers::upload_outfits))
        .route("/v1/outfits/:index", delete(handlers::remove_outfit))
        .route("/v1/try-on", post(handlers::try_on))
        .route("/v1/result", get(handlers::get_result))
        .route("/v1/result/download", get(handlers::download_result))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
