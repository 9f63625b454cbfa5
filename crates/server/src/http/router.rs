use super::handlers::{chat, config_js};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

const BODY_LIMIT: usize = 16 * 1024;

fn allowed_headers() -> [HeaderName; 4] {
    [
        AUTHORIZATION,
        CONTENT_TYPE,
        HeaderName::from_static("apikey"),
        HeaderName::from_static("x-client-info"),
    ]
}

fn cors_layer(allowed_origins: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(allowed_headers());

    if allowed_origins == "*" {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
        base.allow_origin(Any)
    } else {
        tracing::info!("CORS enabled for origins: {:?}", origins);
        base.allow_origin(origins)
    }
}

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    Router::new()
        .route(
            "/functions/v1/chat",
            post(chat::chat).fallback(chat::method_not_allowed),
        )
        .route("/config.js", get(config_js::config_js))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}
