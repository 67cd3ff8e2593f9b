//! Integration tests for the rideshare server.
//!
//! Each test boots the real service on an ephemeral port (`127.0.0.1:0`) and
//! talks to it over HTTP with `reqwest`, so the wire contract is exercised
//! end to end. The geocode upstream is replaced by [`FixtureResolver`]; no
//! test touches the network beyond loopback.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rideshare-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::ServiceExt;
use axum::extract::Request;
use reqwest::Client;
use rideshare_server::config::ServerConfig;
use rideshare_server::geocode::{
    GeocodeError, GeocodeQuery, GeocodeQueue, GeocodeResolver, MokaGeocodeCache,
};
use rideshare_server::routes;
use rideshare_server::state::AppState;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Geocode resolver serving canned payloads and counting upstream calls.
#[derive(Clone, Default)]
pub struct FixtureResolver {
    calls: Arc<AtomicUsize>,
}

impl FixtureResolver {
    /// Number of upstream calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GeocodeResolver for FixtureResolver {
    async fn resolve(&self, query: &GeocodeQuery) -> Result<Value, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match query {
            GeocodeQuery::Address(address) if address.starts_with("unknown") => {
                Err(GeocodeError::Status(404))
            }
            GeocodeQuery::Address(address) => Ok(json!([{
                "lat": "52.0245",
                "lon": "-0.7093",
                "display_name": address,
            }])),
            GeocodeQuery::Coordinates { lat, lon } => Ok(json!({
                "lat": lat.to_string(),
                "lon": lon.to_string(),
                "display_name": "Walton Hall, Milton Keynes",
            })),
        }
    }
}

/// A running server plus a client pointed at it.
pub struct TestServer {
    pub client: Client,
    pub addr: SocketAddr,
    pub resolver: FixtureResolver,
    base_path: String,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Boot a server with default configuration and no geocode delay.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        Self::spawn_with(ServerConfig::default(), Duration::ZERO).await
    }

    /// Boot a server with the given configuration and geocode delay.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn_with(config: ServerConfig, geocode_delay: Duration) -> Self {
        let resolver = FixtureResolver::default();
        let queue = GeocodeQueue::spawn(
            resolver.clone(),
            MokaGeocodeCache::unbounded(),
            geocode_delay,
        );
        let base_path = config.base_path.clone();
        let state = AppState::with_geocoder(config, queue);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let app = routes::service(state);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await;
        });

        Self {
            client: Client::new(),
            addr,
            resolver,
            base_path,
            handle,
        }
    }

    /// Absolute URL for a path under the API prefix.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}{}", self.addr, self.base_path, path)
    }

    /// Absolute URL for a path outside the API prefix.
    #[must_use]
    pub fn root_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
