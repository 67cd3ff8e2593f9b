//! Single-flight geocode queue.
//!
//! All lookups funnel through one worker task that exclusively owns the FIFO,
//! the cache, and the schedule. Callers only hold a [`GeocodeQueue`] handle.
//!
//! # Scheduling
//!
//! The worker is either idle (blocked on the channel with nothing queued) or
//! draining. While draining it takes the head of the FIFO once the scheduled
//! slot has arrived and then:
//!
//! 1. On a cache hit, delivers the cached payload. The next item may run
//!    immediately because no upstream call was made.
//! 2. On a miss, makes exactly one upstream call, caches a successful payload,
//!    and delivers the result. The next slot opens `min_delay` after the call
//!    completed, whether it succeeded or failed, since a failed call still
//!    counts against the upstream rate limit.
//!
//! A result is delivered before the next item starts, so two upstream calls
//! never overlap and are never closer together than `min_delay`.
//!
//! Items are served strictly in submission order. The queue is unbounded:
//! sustained submission faster than one item per `min_delay` grows it
//! without limit. Callers that cannot wait indefinitely should use
//! [`GeocodeQueue::lookup_with_timeout`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, instrument, warn};

use super::{GeocodeCache, GeocodeError, GeocodeQuery, GeocodeResolver};

type Reply = oneshot::Sender<Result<Value, GeocodeError>>;

/// One pending lookup and the waiter that receives its result.
struct QueueItem {
    query: GeocodeQuery,
    reply: Reply,
}

/// Handle to a running geocode queue.
///
/// Cheap to clone. The worker stops once every handle is dropped and the
/// remaining items have been served.
#[derive(Clone)]
pub struct GeocodeQueue {
    tx: mpsc::UnboundedSender<QueueItem>,
    pending: Arc<AtomicUsize>,
}

impl std::fmt::Debug for GeocodeQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodeQueue")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

impl GeocodeQueue {
    /// Spawn the worker on the current Tokio runtime and return its handle.
    #[must_use]
    pub fn spawn<R, C>(resolver: R, cache: C, min_delay: Duration) -> Self
    where
        R: GeocodeResolver,
        C: GeocodeCache,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));

        let worker = Worker {
            resolver,
            cache,
            min_delay,
            pending: Arc::clone(&pending),
        };
        tokio::spawn(worker.run(rx));

        Self { tx, pending }
    }

    /// Number of submitted lookups whose result has not been delivered yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Queue a lookup and wait for its result.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure for this item, or
    /// [`GeocodeError::QueueClosed`] if the worker has stopped.
    pub async fn lookup(&self, query: GeocodeQuery) -> Result<Value, GeocodeError> {
        let (reply, waiter) = oneshot::channel();

        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(QueueItem { query, reply }).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(GeocodeError::QueueClosed);
        }
        debug!(pending = self.pending(), "Queued geocode lookup");

        waiter.await.map_err(|_| GeocodeError::QueueClosed)?
    }

    /// Queue a lookup and wait at most `timeout` for its result.
    ///
    /// On expiry the item stays queued and is still served in order; only
    /// this caller stops waiting.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::TimedOut`] on expiry, otherwise as
    /// [`lookup`](Self::lookup).
    pub async fn lookup_with_timeout(
        &self,
        query: GeocodeQuery,
        timeout: Duration,
    ) -> Result<Value, GeocodeError> {
        tokio::time::timeout(timeout, self.lookup(query))
            .await
            .map_err(|_| GeocodeError::TimedOut(timeout))?
    }

    /// Forward lookup: address to places.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::EmptyAddress`] for a blank address, otherwise
    /// as [`lookup`](Self::lookup).
    pub async fn forward(&self, address: &str) -> Result<Value, GeocodeError> {
        self.lookup(GeocodeQuery::address(address)?).await
    }

    /// Reverse lookup: coordinates to a place.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidCoordinates`] for out-of-range input,
    /// otherwise as [`lookup`](Self::lookup).
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<Value, GeocodeError> {
        self.lookup(GeocodeQuery::coordinates(lat, lon)?).await
    }
}

/// State owned by the worker task.
struct Worker<R, C> {
    resolver: R,
    cache: C,
    min_delay: Duration,
    pending: Arc<AtomicUsize>,
}

impl<R: GeocodeResolver, C: GeocodeCache> Worker<R, C> {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<QueueItem>) {
        let mut next_slot = Instant::now();

        while let Some(item) = rx.recv().await {
            sleep_until(next_slot).await;
            let delay = self.process(item).await;
            next_slot = Instant::now() + delay;

            if rx.is_empty() {
                debug!("Geocode queue drained");
            }
        }

        debug!("Geocode queue closed, worker exiting");
    }

    /// Serve one item and return how long the next one must wait.
    #[instrument(skip_all, fields(query = ?item.query))]
    async fn process(&self, item: QueueItem) -> Duration {
        let QueueItem { query, reply } = item;
        let key = query.cache_key();

        if let Some(cached) = self.cache.get(&key).await {
            debug!("Geocode cache hit");
            self.deliver(reply, Ok(cached));
            return Duration::ZERO;
        }

        info!("Calling geocode service");
        let result = self.resolver.resolve(&query).await;
        match &result {
            Ok(payload) => self.cache.insert(key, payload.clone()).await,
            Err(e) => warn!(error = %e, "Geocode call failed"),
        }
        self.deliver(reply, result);

        debug!(delay_ms = self.min_delay.as_millis(), "Next geocode call delayed");
        self.min_delay
    }

    fn deliver(&self, reply: Reply, result: Result<Value, GeocodeError>) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
        if reply.send(result).is_err() {
            debug!("Geocode caller stopped waiting before delivery");
        }
    }
}
