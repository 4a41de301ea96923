//! Prometheus exposition and per-request accounting.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::api::AppState;
use crate::constants::metrics as metric_names;

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

/// Issues an `x-request-id` for requests that arrive without one.
#[derive(Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Library area a route template belongs to. Unrouted paths collapse into one
/// bucket so arbitrary URLs cannot grow the label set.
fn resource_of(route: Option<&str>) -> &'static str {
    let Some(route) = route else {
        return "unmatched";
    };
    match route.trim_start_matches("/api/").split('/').next() {
        Some("articles") => "articles",
        Some("tags") => "tags",
        Some("book-recommendations") => "recommendations",
        Some("health" | "metrics") => "system",
        _ => "other",
    }
}

const fn outcome_of(status: u16) -> &'static str {
    match status {
        500.. => "server_error",
        400..=499 => "rejected",
        _ => "ok",
    }
}

/// Wraps every request in a span keyed by its request id, then records
/// per-resource counters and latency once the response is ready.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-")
        .to_string();
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string());
    let resource = resource_of(route.as_deref());

    let span = info_span!(
        "api_request",
        request_id = %request_id,
        method = %method,
        path = %req.uri().path(),
        resource,
    );

    async move {
        let response = next.run(req).await;
        let elapsed = start.elapsed();
        let status = response.status().as_u16();
        let outcome = outcome_of(status);

        let route_label = route.unwrap_or_else(|| "unmatched".to_string());
        metrics::counter!(
            metric_names::HTTP_REQUESTS,
            "method" => method.to_string(),
            "route" => route_label.clone(),
            "resource" => resource,
            "outcome" => outcome,
        )
        .increment(1);
        metrics::histogram!(
            metric_names::HTTP_REQUEST_DURATION,
            "method" => method.to_string(),
            "route" => route_label,
        )
        .record(elapsed.as_secs_f64());

        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if status >= 500 {
            metrics::counter!(metric_names::HTTP_REQUEST_FAILURES, "resource" => resource)
                .increment(1);
            warn!(
                event = "shelfmark_request_failed",
                status,
                duration_ms,
                "Request failed"
            );
        } else {
            info!(
                event = "shelfmark_request_completed",
                status,
                outcome,
                duration_ms,
                "Request completed"
            );
        }

        response
    }
    .instrument(span)
    .await
}
