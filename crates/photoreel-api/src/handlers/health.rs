//! Liveness and readiness probes.

use std::future::Future;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// Liveness probe. Never touches dependencies.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    /// Photo store answers
    pub storage: DependencyCheck,
    /// Encoder binary resolves
    pub encoder: DependencyCheck,
}

/// Outcome of probing one dependency.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DependencyCheck {
    Ok { latency_ms: u64 },
    Error { error: String },
}

impl DependencyCheck {
    /// Run `probe`, timing it.
    async fn run<F, E>(probe: F) -> Self
    where
        F: Future<Output = Result<(), E>>,
        E: std::fmt::Display,
    {
        let started = Instant::now();
        match probe.await {
            Ok(()) => DependencyCheck::Ok {
                latency_ms: started.elapsed().as_millis() as u64,
            },
            Err(e) => DependencyCheck::Error {
                error: e.to_string(),
            },
        }
    }

    fn passed(&self) -> bool {
        matches!(self, DependencyCheck::Ok { .. })
    }
}

/// Readiness probe: the photo store and the slideshow encoder.
///
/// Answers 503 with the same body when either check fails.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let checks = ReadinessChecks {
        storage: DependencyCheck::run(state.store.check_health()).await,
        encoder: DependencyCheck::run(state.slideshow.encoder().check()).await,
    };

    if checks.storage.passed() && checks.encoder.passed() {
        (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready",
                checks,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "degraded",
                checks,
            }),
        )
    }
}
