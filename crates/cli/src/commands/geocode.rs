//! Geocode commands.
//!
//! All lookups of one invocation share a single queue, so a repeated address
//! is answered from the cache and distinct addresses are spaced by
//! `GEOCODE_MIN_DELAY_MS`.
//!
//! # Environment Variables
//!
//! - `GEOCODE_BASE_URL` - Upstream base URL
//! - `GEOCODE_USER_AGENT` - Outbound User-Agent
//! - `GEOCODE_COUNTRY_CODES` - Forward lookup country filter
//! - `GEOCODE_MIN_DELAY_MS` - Minimum delay between upstream calls

use rideshare_server::config::{ConfigError, GeocodeConfig};
use rideshare_server::geocode::{GeocodeError, GeocodeQueue, MokaGeocodeCache, NominatimClient};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during geocode commands.
#[derive(Debug, Error)]
pub enum GeocodeCommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Lookup failed.
    #[error("Geocode error: {0}")]
    Geocode(#[from] GeocodeError),

    /// Payload could not be printed.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

fn queue() -> Result<GeocodeQueue, GeocodeCommandError> {
    let config = GeocodeConfig::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        delay_ms = config.min_delay.as_millis(),
        "Using geocode service"
    );

    let client = NominatimClient::new(&config)?;
    let cache = MokaGeocodeCache::new(&config);
    Ok(GeocodeQueue::spawn(client, cache, config.min_delay))
}

#[allow(clippy::print_stdout)]
fn print(payload: &Value) -> Result<(), GeocodeCommandError> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}

/// Forward geocode each address in order.
///
/// A failed lookup is reported and the remaining addresses still run.
///
/// # Errors
///
/// Returns an error if configuration is invalid or any lookup failed.
pub async fn search(addresses: &[String]) -> Result<(), GeocodeCommandError> {
    let queue = queue()?;
    let mut last_error = None;

    for address in addresses {
        match queue.forward(address).await {
            Ok(payload) => print(&payload)?,
            Err(e) => {
                tracing::error!(address = %address, error = %e, "Lookup failed");
                last_error = Some(e);
            }
        }
    }

    last_error.map_or(Ok(()), |e| Err(e.into()))
}

/// Reverse geocode one coordinate pair.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the lookup failed.
pub async fn reverse(lat: f64, lon: f64) -> Result<(), GeocodeCommandError> {
    let payload = queue()?.reverse(lat, lon).await?;
    print(&payload)
}
