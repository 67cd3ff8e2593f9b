//! Nominatim (OpenStreetMap) HTTP client.
//!
//! Every call is a single GET. The upstream usage policy forbids more than
//! one request per second and requires an identifying User-Agent; spacing is
//! enforced by the queue, not here.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, instrument};
use url::Url;

use super::{GeocodeError, GeocodeQuery, GeocodeResolver};
use crate::config::GeocodeConfig;

/// Client for the Nominatim search and reverse endpoints.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    /// HTTP client.
    client: Client,
    /// Service root, e.g. `https://nominatim.openstreetmap.org/`.
    base_url: Url,
    /// Country filter for forward lookups.
    country_codes: Option<String>,
}

impl NominatimClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Request`] if the HTTP client cannot be built.
    pub fn new(config: &GeocodeConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            country_codes: config.country_codes.clone(),
        })
    }

    /// Build the upstream URL for a lookup.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidUrl`] if the base URL cannot carry a path.
    pub fn url_for(&self, query: &GeocodeQuery) -> Result<Url, GeocodeError> {
        let mut url = self.base_url.clone();
        let endpoint = match query {
            GeocodeQuery::Address(_) => "search",
            GeocodeQuery::Coordinates { .. } => "reverse",
        };
        url.path_segments_mut()
            .map_err(|()| GeocodeError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(endpoint);

        {
            let mut pairs = url.query_pairs_mut();
            match query {
                GeocodeQuery::Address(address) => {
                    pairs.append_pair("q", address).append_pair("format", "json");
                    if let Some(codes) = &self.country_codes {
                        pairs.append_pair("countrycodes", codes);
                    }
                }
                GeocodeQuery::Coordinates { lat, lon } => {
                    pairs
                        .append_pair("format", "jsonv2")
                        .append_pair("lat", &lat.to_string())
                        .append_pair("lon", &lon.to_string());
                }
            }
        }

        Ok(url)
    }
}

impl GeocodeResolver for NominatimClient {
    #[instrument(skip(self))]
    async fn resolve(&self, query: &GeocodeQuery) -> Result<Value, GeocodeError> {
        let url = self.url_for(query)?;
        debug!(url = %url, "Sending geocode request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Geocode service returned non-success status");
            return Err(GeocodeError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GeocodeError::Decode(e.to_string()))
    }
}
