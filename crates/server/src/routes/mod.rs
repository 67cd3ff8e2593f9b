//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//!
//! # Under the configured prefix (default /openstack/taxi)
//! GET    /orders?userid=                  - Caller's orders
//! GET    /orders/{id}?userid=             - One of the caller's orders
//! POST   /orders                          - Create an order
//! DELETE /orders/{id}?userid=             - Delete one of the caller's orders
//! GET    /matches?userid=                 - Offer/request pairings involving the caller
//! POST   /users                           - Acknowledge a user
//! GET    /geocode/search?q=               - Forward geocode (queued)
//! GET    /geocode/reverse?lat=&lon=       - Reverse geocode (queued)
//! ```
//!
//! A trailing slash on any path is ignored.

pub mod geocode;
pub mod matches;
pub mod orders;
pub mod users;

use axum::{
    Router,
    extract::Request,
    middleware::from_fn,
    routing::{get, post},
};
use rideshare_core::UserId;
use serde::Deserialize;
use tower::Layer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::{AppError, Result};
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Query string carrying the caller's identity.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub userid: Option<String>,
}

/// Require a non-blank user id.
pub(crate) fn require_user(raw: Option<String>) -> Result<UserId> {
    raw.filter(|id| !id.trim().is_empty())
        .map(UserId::new)
        .ok_or_else(|| AppError::BadRequest("userid is required".to_string()))
}

/// Create the API routes mounted under the configured prefix.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::index).post(orders::create))
        .route("/orders/{id}", get(orders::show).delete(orders::delete))
        .route("/matches", get(matches::index))
        .route("/users", post(users::create))
        .route("/geocode/search", get(geocode::search))
        .route("/geocode/reverse", get(geocode::reverse))
}

/// Build the full application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let base_path = state.config().base_path.clone();

    let router = Router::new().route("/health", get(health));
    // Axum refuses to nest at the root
    let router = if base_path.is_empty() {
        router.merge(api_routes())
    } else {
        router.nest(&base_path, api_routes())
    };

    router
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Wrap the application so that `/matches/` routes like `/matches`.
///
/// Path normalization must run before routing, so it wraps the router
/// rather than being added with `Router::layer`.
pub fn service(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(app(state))
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
