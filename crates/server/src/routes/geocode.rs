//! Geocode route handlers.
//!
//! Lookups go through the shared [`GeocodeQueue`](crate::geocode::GeocodeQueue),
//! so HTTP callers share its cache and upstream spacing. A caller that waits
//! longer than the configured lookup timeout gets a 504 while its lookup
//! still completes and populates the cache.

use axum::extract::{Query, State, rejection::QueryRejection};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::envelope::Envelope;
use crate::error::{AppError, Result};
use crate::geocode::GeocodeQuery;
use crate::state::AppState;

/// Query of `GET geocode/search`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Query of `GET geocode/reverse`.
#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lon: f64,
}

/// Forward lookup of an address.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Envelope<Value>> {
    let address = query
        .ok()
        .and_then(|Query(q)| q.q)
        .ok_or_else(|| AppError::BadRequest("q is required".to_string()))?;

    lookup(&state, GeocodeQuery::address(&address)?).await
}

/// Reverse lookup of a coordinate pair.
#[instrument(skip(state))]
pub async fn reverse(
    State(state): State<AppState>,
    query: std::result::Result<Query<ReverseQuery>, QueryRejection>,
) -> Result<Envelope<Value>> {
    let Query(ReverseQuery { lat, lon }) =
        query.map_err(|e| AppError::BadRequest(e.body_text()))?;

    lookup(&state, GeocodeQuery::coordinates(lat, lon)?).await
}

async fn lookup(state: &AppState, query: GeocodeQuery) -> Result<Envelope<Value>> {
    let timeout = state.config().geocode.lookup_timeout;
    let payload = state
        .geocoder()
        .lookup_with_timeout(query, timeout)
        .await?;
    Ok(Envelope::data(payload))
}
