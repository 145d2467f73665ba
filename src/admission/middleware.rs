//! Admission middleware.
//! Applies the fixed-window controller to every request under the API prefix.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::net::SocketAddr;

use crate::http::server::AppState;
use crate::observability::metrics;

/// Shared budget key for requests with no resolvable peer address.
pub const FALLBACK_CLIENT_KEY: &str = "unknown";

pub async fn admission_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Peer address is attached by into_make_service_with_connect_info; a
    // request without one degrades to the shared fallback budget.
    let client_key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| FALLBACK_CLIENT_KEY.to_string());

    let decision = state.admission.evaluate(&client_key);
    if decision.allowed {
        return next.run(request).await;
    }

    tracing::warn!(
        client = %client_key,
        retry_after_secs = decision.retry_after_secs,
        "Request rate limit exceeded"
    );
    metrics::record_admission_denied();

    let body = Json(serde_json::json!({
        "error": "too_many_requests",
        "message": "Request rate limit exceeded, please retry later",
        "retryAfter": decision.retry_after_secs,
        "development": state.development,
    }));

    let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::RETRY_AFTER, decision.retry_after_secs.into());
    headers.insert("x-ratelimit-limit", decision.limit.into());
    headers.insert("x-ratelimit-remaining", decision.remaining.into());
    headers.insert("x-ratelimit-reset", decision.reset_at.into());
    response
}
