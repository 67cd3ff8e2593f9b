//! Address and coordinate resolution through a rate-limited upstream.
//!
//! # Architecture
//!
//! - [`NominatimClient`] performs one HTTP GET per lookup (forward or reverse)
//! - [`GeocodeCache`] remembers every successful payload, keyed by [`GeocodeKey`]
//! - [`GeocodeQueue`] serializes all lookups through one worker task so that
//!   two upstream calls are never closer together than the configured delay
//!
//! Payloads are opaque JSON: they are cached and handed back verbatim.
//!
//! # Example
//!
//! ```rust,ignore
//! use rideshare_server::geocode::{GeocodeQueue, MokaGeocodeCache, NominatimClient};
//!
//! let client = NominatimClient::new(&config.geocode)?;
//! let cache = MokaGeocodeCache::new(&config.geocode);
//! let queue = GeocodeQueue::spawn(client, cache, config.geocode.min_delay);
//!
//! let places = queue.forward("Walton Hall, Milton Keynes").await?;
//! let place = queue.reverse(52.0245, -0.7093).await?;
//! ```

mod cache;
mod client;
mod queue;

pub use cache::{GeocodeCache, MokaGeocodeCache};
pub use client::NominatimClient;
pub use queue::GeocodeQueue;

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while resolving a lookup.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The address is empty after trimming.
    #[error("address cannot be empty")]
    EmptyAddress,

    /// Latitude or longitude is out of range or not finite.
    #[error("invalid coordinates ({lat}, {lon})")]
    InvalidCoordinates {
        /// Latitude as given.
        lat: f64,
        /// Longitude as given.
        lon: f64,
    },

    /// The upstream URL could not be built.
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(String),

    /// HTTP request failed before a response arrived.
    #[error("geocode request failed: {0}")]
    Request(String),

    /// Upstream answered with a non-success status.
    #[error("geocode service returned HTTP {0}")]
    Status(u16),

    /// Upstream body was not valid JSON.
    #[error("geocode response error: {0}")]
    Decode(String),

    /// The caller stopped waiting.
    #[error("geocode lookup timed out after {0:?}")]
    TimedOut(Duration),

    /// The queue worker is gone.
    #[error("geocode queue is closed")]
    QueueClosed,
}

impl GeocodeError {
    /// Whether the error was caused by the caller's input.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::EmptyAddress | Self::InvalidCoordinates { .. })
    }
}

/// One lookup: forward (address to coordinates) or reverse.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeQuery {
    /// Forward lookup of a whitespace-normalized address.
    Address(String),
    /// Reverse lookup of a coordinate pair.
    Coordinates {
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lon: f64,
    },
}

impl GeocodeQuery {
    /// Build a forward lookup.
    ///
    /// Leading and trailing whitespace is removed and inner runs of
    /// whitespace collapse to one space.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::EmptyAddress`] if nothing is left.
    pub fn address(raw: &str) -> Result<Self, GeocodeError> {
        let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }
        Ok(Self::Address(normalized))
    }

    /// Build a reverse lookup.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidCoordinates`] unless latitude is within
    /// ±90 and longitude within ±180.
    pub fn coordinates(lat: f64, lon: f64) -> Result<Self, GeocodeError> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if !valid {
            return Err(GeocodeError::InvalidCoordinates { lat, lon });
        }
        Ok(Self::Coordinates { lat, lon })
    }

    /// Cache key for this lookup.
    #[must_use]
    pub fn cache_key(&self) -> GeocodeKey {
        match self {
            Self::Address(address) => GeocodeKey::Address(address.clone()),
            Self::Coordinates { lat, lon } => GeocodeKey::Coordinates(format!("{lat},{lon}")),
        }
    }
}

/// Cache key for geocode payloads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum GeocodeKey {
    /// Normalized address.
    Address(String),
    /// `"lat,lon"`.
    Coordinates(String),
}

/// Something that can resolve a lookup against the upstream service.
///
/// Implemented by [`NominatimClient`]; tests supply their own.
pub trait GeocodeResolver: Send + Sync + 'static {
    /// Perform exactly one upstream call.
    fn resolve(&self, query: &GeocodeQuery)
    -> impl Future<Output = Result<Value, GeocodeError>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_normalized() {
        let query = GeocodeQuery::address("  Walton   Hall,\tMilton Keynes ").unwrap();
        assert_eq!(
            query,
            GeocodeQuery::Address("Walton Hall, Milton Keynes".to_string())
        );
        assert_eq!(
            query.cache_key(),
            GeocodeQuery::address("Walton Hall, Milton Keynes")
                .unwrap()
                .cache_key()
        );
    }

    #[test]
    fn test_empty_address_rejected() {
        assert!(matches!(
            GeocodeQuery::address("   "),
            Err(GeocodeError::EmptyAddress)
        ));
    }

    #[test]
    fn test_coordinates_key() {
        let query = GeocodeQuery::coordinates(52.5, -0.75).unwrap();
        assert_eq!(
            query.cache_key(),
            GeocodeKey::Coordinates("52.5,-0.75".to_string())
        );
    }

    #[test]
    fn test_coordinates_out_of_range() {
        assert!(GeocodeQuery::coordinates(91.0, 0.0).is_err());
        assert!(GeocodeQuery::coordinates(0.0, -180.5).is_err());
        assert!(
            GeocodeQuery::coordinates(f64::NAN, 0.0)
                .unwrap_err()
                .is_invalid_input()
        );
        assert!(GeocodeQuery::coordinates(-90.0, 180.0).is_ok());
    }
}
