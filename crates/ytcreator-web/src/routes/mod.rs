pub mod docs;
pub mod health;
pub mod page;
pub mod sessions;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{config::Config, middleware::logging, state::AppState};

/// Full application router: the HTML page, the JSON session API and health
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);
    let cors = build_cors_layer(&state.config);

    Router::new()
        // Page
        .route("/", get(page::index).post(page::submit))
        // Health
        .route("/health", get(health::health_check))
        // Sessions
        .route("/api/sessions", post(sessions::create_session))
        .route("/api/sessions/:session_id", delete(sessions::delete_session))
        .route("/api/sessions/:session_id/generate", post(sessions::generate))
        .route("/api/sessions/:session_id/history", get(sessions::get_history))
        // Docs
        .route("/api/openapi.json", get(docs::openapi_json))
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::new();
    }

    let cors = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any);

    if config.cors.origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let parsed_origins: Vec<axum::http::HeaderValue> = config
            .cors
            .origins
            .iter()
            .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
            .collect();

        cors.allow_origin(parsed_origins)
    }
}
