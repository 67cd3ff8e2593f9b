//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! ## Server
//! - `RIDESHARE_HOST` - Bind address (default: 127.0.0.1)
//! - `RIDESHARE_PORT` - Listen port (default: 3000)
//! - `RIDESHARE_BASE_PATH` - Route prefix (default: /openstack/taxi)
//! - `RIDESHARE_ORDER_CAPACITY` - Maximum number of live orders (default: 10)
//!
//! ## Geocoding
//! - `GEOCODE_BASE_URL` - Upstream base URL (default: <https://nominatim.openstreetmap.org>)
//! - `GEOCODE_USER_AGENT` - Outbound User-Agent (default: rideshare/<version>)
//! - `GEOCODE_COUNTRY_CODES` - Forward lookup country filter, empty to disable (default: gb)
//! - `GEOCODE_MIN_DELAY_MS` - Minimum delay between upstream calls (default: 5000)
//! - `GEOCODE_LOOKUP_TIMEOUT_SECS` - How long an HTTP caller waits for a lookup (default: 60)
//! - `GEOCODE_CACHE_TTL_SECS` - Cache entry lifetime (default: unset, entries never expire)
//! - `GEOCODE_CACHE_MAX_ENTRIES` - Cache size bound (default: unset, unbounded)
//!
//! ## Error tracking
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use rideshare_core::DEFAULT_ORDER_CAPACITY;
use thiserror::Error;
use url::Url;

const DEFAULT_BASE_PATH: &str = "/openstack/taxi";
const DEFAULT_GEOCODE_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_COUNTRY_CODES: &str = "gb";
const DEFAULT_MIN_DELAY_MS: u64 = 5000;
const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Prefix for every API route, e.g. `/openstack/taxi` (empty for root)
    pub base_path: String,
    /// Maximum number of live orders
    pub order_capacity: usize,
    /// Geocoding configuration
    pub geocode: GeocodeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Upstream geocoding configuration.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// Base URL of the geocoding service
    pub base_url: Url,
    /// User-Agent sent with every upstream request
    pub user_agent: String,
    /// Country filter for forward lookups
    pub country_codes: Option<String>,
    /// Minimum delay between two upstream calls
    pub min_delay: Duration,
    /// How long an HTTP caller waits for a queued lookup
    pub lookup_timeout: Duration,
    /// Cache entry lifetime (`None` keeps entries for the process lifetime)
    pub cache_ttl: Option<Duration>,
    /// Cache size bound (`None` is unbounded)
    pub cache_max_entries: Option<u64>,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_GEOCODE_BASE_URL)
                .expect("default geocode base URL is valid"),
            user_agent: default_user_agent(),
            country_codes: Some(DEFAULT_COUNTRY_CODES.to_string()),
            min_delay: Duration::from_millis(DEFAULT_MIN_DELAY_MS),
            lookup_timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
            cache_ttl: None,
            cache_max_entries: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_path: DEFAULT_BASE_PATH.to_string(),
            order_capacity: DEFAULT_ORDER_CAPACITY,
            geocode: GeocodeConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = parse_or_default(env, "RIDESHARE_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or_default(env, "RIDESHARE_PORT", 3000_u16)?;
        let base_path = normalize_base_path(
            &env("RIDESHARE_BASE_PATH").unwrap_or_else(|| DEFAULT_BASE_PATH.to_string()),
        );
        let order_capacity =
            parse_or_default(env, "RIDESHARE_ORDER_CAPACITY", DEFAULT_ORDER_CAPACITY)?;
        if order_capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "RIDESHARE_ORDER_CAPACITY".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            base_path,
            order_capacity,
            geocode: GeocodeConfig::from_lookup(env)?,
            sentry_dsn: env("SENTRY_DSN"),
            sentry_environment: env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl GeocodeConfig {
    /// Load geocoding configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load geocoding configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = match env("GEOCODE_BASE_URL") {
            Some(raw) => parse_base_url("GEOCODE_BASE_URL", &raw)?,
            None => Self::default().base_url,
        };
        let user_agent = env("GEOCODE_USER_AGENT")
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(default_user_agent);
        let country_codes = env("GEOCODE_COUNTRY_CODES")
            .unwrap_or_else(|| DEFAULT_COUNTRY_CODES.to_string());
        let country_codes = Some(country_codes.trim().to_string()).filter(|c| !c.is_empty());

        let min_delay = Duration::from_millis(parse_or_default(
            env,
            "GEOCODE_MIN_DELAY_MS",
            DEFAULT_MIN_DELAY_MS,
        )?);
        let lookup_timeout = Duration::from_secs(parse_or_default(
            env,
            "GEOCODE_LOOKUP_TIMEOUT_SECS",
            DEFAULT_LOOKUP_TIMEOUT_SECS,
        )?);
        let cache_ttl = parse_optional::<u64>(env, "GEOCODE_CACHE_TTL_SECS")?.map(Duration::from_secs);
        let cache_max_entries = parse_optional(env, "GEOCODE_CACHE_MAX_ENTRIES")?;

        Ok(Self {
            base_url,
            user_agent,
            country_codes,
            min_delay,
            lookup_timeout,
            cache_ttl,
            cache_max_entries,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn default_user_agent() -> String {
    format!("rideshare/{}", env!("CARGO_PKG_VERSION"))
}

/// Parse an environment variable, falling back to a default when unset.
fn parse_or_default<T>(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_optional(env, key)?.unwrap_or(default))
}

/// Parse an environment variable if it is set.
fn parse_optional<T>(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

/// Parse an http(s) base URL.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Normalize a route prefix to a leading `/` and no trailing `/`.
///
/// The root prefix normalizes to an empty string.
fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(&lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.base_path, "/openstack/taxi");
        assert_eq!(config.order_capacity, 10);
        assert_eq!(config.geocode.min_delay, Duration::from_millis(5000));
        assert_eq!(config.geocode.country_codes.as_deref(), Some("gb"));
        assert_eq!(
            config.geocode.base_url.as_str(),
            "https://nominatim.openstreetmap.org/"
        );
        assert!(config.geocode.cache_ttl.is_none());
        assert!(config.geocode.cache_max_entries.is_none());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(&lookup(&[
            ("RIDESHARE_PORT", "8080"),
            ("RIDESHARE_BASE_PATH", "api/v1/"),
            ("RIDESHARE_ORDER_CAPACITY", "25"),
            ("GEOCODE_MIN_DELAY_MS", "1500"),
            ("GEOCODE_COUNTRY_CODES", ""),
            ("GEOCODE_CACHE_TTL_SECS", "3600"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.base_path, "/api/v1");
        assert_eq!(config.order_capacity, 25);
        assert_eq!(config.geocode.min_delay, Duration::from_millis(1500));
        assert!(config.geocode.country_codes.is_none());
        assert_eq!(config.geocode.cache_ttl, Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_invalid_port() {
        let result = ServerConfig::from_lookup(&lookup(&[("RIDESHARE_PORT", "http")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "RIDESHARE_PORT"));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = ServerConfig::from_lookup(&lookup(&[("RIDESHARE_ORDER_CAPACITY", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_base_url_must_be_http() {
        let result = GeocodeConfig::from_lookup(&lookup(&[("GEOCODE_BASE_URL", "ftp://example")]));
        assert!(result.is_err());

        let result = GeocodeConfig::from_lookup(&lookup(&[("GEOCODE_BASE_URL", "not a url")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("/openstack/taxi/"), "/openstack/taxi");
        assert_eq!(normalize_base_path("openstack/taxi"), "/openstack/taxi");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path(""), "");
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::default();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
