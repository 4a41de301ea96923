use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct HealthLiveResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthReadyResponse {
    pub ready: bool,
    pub storage: &'static str,
    pub uptime_seconds: u64,
    pub checks: HealthReadinessChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthReadinessChecks {
    pub database: bool,
}

/// `GET /api/health`
pub async fn health_live() -> impl IntoResponse {
    Json(ApiResponse::success(HealthLiveResponse { status: "ok" }))
}

/// `GET /api/health/ready`
///
/// Readiness check against the storage backend.
pub async fn health_ready(State(state): State<Arc<AppState>>) -> Response {
    let database = match state.shared.backend.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Storage ping failed");
            false
        }
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthReadyResponse {
            ready: database,
            storage: state.shared.backend.name(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
            checks: HealthReadinessChecks { database },
        })),
    )
        .into_response()
}

/// Fallback for paths outside the route table.
pub async fn route_not_found(uri: axum::http::Uri) -> super::ApiError {
    super::ApiError::not_found("route", uri.path())
}
