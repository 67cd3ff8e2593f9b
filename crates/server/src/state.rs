//! Application state shared across handlers.

use std::sync::{Arc, Mutex};

use rideshare_core::OrderStore;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::geocode::{GeocodeError, GeocodeQueue, MokaGeocodeCache, NominatimClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The order store sits behind a
/// single mutex held for the whole of each store operation, so concurrent
/// requests never observe a half-applied insert or delete.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    orders: Mutex<OrderStore>,
    geocoder: GeocodeQueue,
}

impl AppState {
    /// Create a new application state backed by the upstream geocoder.
    ///
    /// Must be called from within a Tokio runtime, since it spawns the
    /// geocode worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the geocode HTTP client cannot be built.
    pub fn new(config: ServerConfig) -> Result<Self, GeocodeError> {
        let client = NominatimClient::new(&config.geocode)?;
        let cache = MokaGeocodeCache::new(&config.geocode);
        let geocoder = GeocodeQueue::spawn(client, cache, config.geocode.min_delay);

        Ok(Self::with_geocoder(config, geocoder))
    }

    /// Create application state around an existing geocode queue.
    #[must_use]
    pub fn with_geocoder(config: ServerConfig, geocoder: GeocodeQueue) -> Self {
        let orders = OrderStore::new(config.order_capacity);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                orders: Mutex::new(orders),
                geocoder,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the geocode queue.
    #[must_use]
    pub fn geocoder(&self) -> &GeocodeQueue {
        &self.inner.geocoder
    }

    /// Run `f` with exclusive access to the order store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if a previous holder panicked.
    pub fn with_orders<T>(&self, f: impl FnOnce(&mut OrderStore) -> T) -> Result<T, AppError> {
        let mut orders = self
            .inner
            .orders
            .lock()
            .map_err(|_| AppError::Internal("order store lock poisoned".to_string()))?;
        Ok(f(&mut orders))
    }
}
