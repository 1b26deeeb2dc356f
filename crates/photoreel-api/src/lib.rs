//! Axum HTTP API server.
//!
//! This crate provides:
//! - Photo and album CRUD over a pluggable photo store
//! - Slideshow video generation (`POST /api/generate-video`)
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::{ApiConfig, SlideshowConfig};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{PipelineError, SlideshowService};
pub use state::AppState;
