//! API routes.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{
    create_album, create_photo, delete_album, delete_photo, generate_video, get_album,
    get_photo_image, health, list_albums, list_photos, put_photo_image, ready, search_photos,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    ClientRateLimiter,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let photo_routes = Router::new()
        .route("/photos", get(list_photos).post(create_photo))
        .route("/photos/search", get(search_photos))
        .route("/photos/:id", delete(delete_photo))
        .route("/photos/:id/image", get(get_photo_image).put(put_photo_image));

    let album_routes = Router::new()
        .route("/albums", get(list_albums).post(create_album))
        .route("/albums/:id", get(get_album).delete(delete_album));

    let slideshow_routes = Router::new().route("/generate-video", post(generate_video));

    let rate_limiter = Arc::new(ClientRateLimiter::new(
        state.config.rate_limit_rps,
        state.config.rate_limit_burst,
    ));

    let api_routes = Router::new()
        .merge(photo_routes)
        .merge(album_routes)
        .merge(slideshow_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Layers run outermost-last: request_id must wrap request_logging.
    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Base64 photo uploads exceed the extractor default, so the tower limit governs.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
