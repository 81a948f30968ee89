use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Recording control
        .route("/feedback/record/start", post(handlers::start_recording))
        .route("/feedback/record/stop", post(handlers::stop_recording))
        // Session state and text edits
        .route("/feedback/session", get(handlers::get_session))
        .route("/feedback/text", put(handlers::update_text))
        // Analysis
        .route("/feedback/analyze", post(handlers::analyze))
        // Browser front-end friendliness + request logging
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
