//! Tile retrieval
//!
//! The tile-fetch collaborator surface and the policy around it. Fetching
//! itself is external (anything implementing [`TileFetcher`]); this module
//! owns the retry policy (capped exponential backoff with a
//! retryable-error predicate, as an explicit value rather than control
//! flow), bounded-concurrency retrieval with an optional politeness
//! interval, per-attempt timeouts, and prompt cancellation. Results are
//! keyed by descriptor and tolerate any arrival order.

mod http;

pub use http::{HttpClient, HttpTileFetcher, ReqwestClient};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::geometry::GeoBounds;
use crate::tile::{TileDescriptor, TileGridPlan};

/// Default per-attempt timeout.
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 30;

/// Default bounded worker pool size.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Boxed future type for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// How a single tile fetch failed.
///
/// The taxonomy drives the retry predicate: transient network conditions
/// and timeouts are retryable; a server-reported error (including an
/// error payload embedded in a nominally successful response) is a hard
/// per-tile failure and is not retried.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Transient network failure; retryable.
    #[error("transient fetch failure: {0}")]
    Transient(String),

    /// The attempt exceeded its timeout; retryable.
    #[error("fetch attempt timed out after {0:?}")]
    Timeout(Duration),

    /// Server-reported error; not retryable.
    #[error("server-reported error: {0}")]
    Server(String),

    /// The retrieval was cancelled.
    #[error("fetch cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transient(_) | FetchError::Timeout(_))
    }
}

/// What a fetcher is asked to produce: raw image bytes for a geographic
/// rectangle at a pixel size.
#[derive(Clone, Debug)]
pub struct FetchRequest {
    pub geo_bounds: GeoBounds,
    pub pixel_size: (u32, u32),
    pub resolution: f64,
    /// Pyramid zoom level, when the plan chose one.
    pub zoom: Option<u8>,
}

impl FetchRequest {
    pub fn for_tile(descriptor: &TileDescriptor, zoom: Option<u8>) -> Self {
        Self {
            geo_bounds: descriptor.geo_bounds,
            pixel_size: descriptor.pixel_size,
            resolution: descriptor.resolution,
            zoom,
        }
    }
}

/// The external tile retrieval collaborator.
pub trait TileFetcher: Send + Sync {
    /// Fetches raw image bytes for the requested rectangle.
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<Bytes, FetchError>>;
}

/// How transient failures are retried.
///
/// An explicit policy value consumed by [`retrieve`]: attempts and backoff
/// are data, not control flow.
#[derive(Clone, Debug, PartialEq)]
pub enum RetryPolicy {
    /// Fail immediately on the first error.
    None,

    /// Delay doubles after each failed attempt, up to a cap.
    ExponentialBackoff {
        /// Maximum number of attempts, including the initial one.
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        multiplier: f64,
    },
}

impl Default for RetryPolicy {
    /// Base 1 s, doubling, capped at 8 s, eight attempts.
    fn default() -> Self {
        Self::ExponentialBackoff {
            max_attempts: 8,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// An exponential policy with the default schedule and the given
    /// attempt budget.
    pub fn exponential(max_attempts: u32) -> Self {
        match Self::default() {
            Self::ExponentialBackoff {
                initial_delay,
                max_delay,
                multiplier,
                ..
            } => Self::ExponentialBackoff {
                max_attempts,
                initial_delay,
                max_delay,
                multiplier,
            },
            Self::None => unreachable!("default policy is exponential"),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::ExponentialBackoff { max_attempts, .. } => *max_attempts,
        }
    }

    /// Delay before the retry following failed attempt number `attempt`
    /// (1-based), or `None` when the budget is exhausted.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::ExponentialBackoff {
                max_attempts,
                initial_delay,
                max_delay,
                multiplier,
            } => {
                if attempt < *max_attempts {
                    let factor = multiplier.powi(attempt.saturating_sub(1) as i32);
                    let delay = initial_delay.as_secs_f64() * factor;
                    Some(Duration::from_secs_f64(
                        delay.min(max_delay.as_secs_f64()),
                    ))
                } else {
                    None
                }
            }
        }
    }

    /// The retry decision: a delay when the error is retryable and the
    /// attempt budget allows another try.
    pub fn next_delay(&self, attempt: u32, error: &FetchError) -> Option<Duration> {
        if error.is_retryable() {
            self.delay_for_attempt(attempt)
        } else {
            None
        }
    }
}

/// Options for a retrieval run.
#[derive(Clone, Debug)]
pub struct FetchOptions {
    pub retry: RetryPolicy,
    /// Bounded worker pool size.
    pub concurrency: usize,
    /// Minimum interval between request launches, a politeness courtesy
    /// to the source service. Scoped to this retrieval only; unrelated
    /// layers are never serialized against each other.
    pub request_interval: Option<Duration>,
    /// Per-attempt timeout, after which the attempt counts as a
    /// retryable failure.
    pub attempt_timeout: Duration,
    pub cancel: CancellationToken,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            concurrency: DEFAULT_CONCURRENCY,
            request_interval: None,
            attempt_timeout: Duration::from_secs(DEFAULT_ATTEMPT_TIMEOUT_SECS),
            cancel: CancellationToken::new(),
        }
    }
}

impl FetchOptions {
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = Some(interval);
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Retrieval failure for a whole plan: every tile whose retries were
/// exhausted, collected rather than first-failure-aborted.
#[derive(Debug, Error)]
#[error("{} of {} tiles failed to fetch", .failures.len(), .attempted)]
pub struct RetrieveError {
    pub attempted: usize,
    pub failures: Vec<(TileDescriptor, FetchError)>,
}

/// Minimum-interval gate shared by one retrieval's workers.
struct RateGate {
    interval: Duration,
    last_launch: Mutex<Option<Instant>>,
}

impl RateGate {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_launch: Mutex::new(None),
        }
    }

    async fn wait_turn(&self) {
        let mut last = self.last_launch.lock().await;
        if let Some(previous) = *last {
            let ready = previous + self.interval;
            if ready > Instant::now() {
                tokio::time::sleep_until(ready).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Fetches every tile of a plan through a bounded worker pool.
///
/// Each descriptor is an independent fetch unit; results arrive in any
/// order and are keyed by descriptor. Individual failures are retried per
/// the options' policy; exhausted tiles are collected into a single
/// [`RetrieveError`]. Cancellation stops issuing new fetches promptly and
/// discards partial results.
pub async fn retrieve(
    plan: &TileGridPlan,
    fetcher: Arc<dyn TileFetcher>,
    options: &FetchOptions,
) -> Result<Vec<(TileDescriptor, Bytes)>, RetrieveError> {
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let gate = options.request_interval.map(|i| Arc::new(RateGate::new(i)));

    debug!(
        tiles = plan.tile_count(),
        concurrency = options.concurrency,
        "retrieving tile grid"
    );

    let futures = plan.tiles.iter().map(|&descriptor| {
        let semaphore = Arc::clone(&semaphore);
        let gate = gate.clone();
        let fetcher = Arc::clone(&fetcher);
        let options = options.clone();
        let request = FetchRequest::for_tile(&descriptor, plan.zoom);
        async move {
            let permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => return (descriptor, Err(FetchError::Cancelled)),
            };
            let result = fetch_with_retries(&*fetcher, request, &options, gate.as_deref()).await;
            drop(permit);
            (descriptor, result)
        }
    });

    let outcomes = futures::future::join_all(futures).await;

    let attempted = outcomes.len();
    let mut fetched = Vec::with_capacity(attempted);
    let mut failures = Vec::new();
    for (descriptor, outcome) in outcomes {
        match outcome {
            Ok(bytes) => fetched.push((descriptor, bytes)),
            Err(error) => failures.push((descriptor, error)),
        }
    }

    if failures.is_empty() {
        Ok(fetched)
    } else {
        Err(RetrieveError {
            attempted,
            failures,
        })
    }
}

async fn fetch_with_retries(
    fetcher: &dyn TileFetcher,
    request: FetchRequest,
    options: &FetchOptions,
    gate: Option<&RateGate>,
) -> Result<Bytes, FetchError> {
    let mut attempt = 1u32;
    loop {
        if options.cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        if let Some(gate) = gate {
            gate.wait_turn().await;
        }

        let outcome = tokio::select! {
            _ = options.cancel.cancelled() => Err(FetchError::Cancelled),
            attempted = tokio::time::timeout(
                options.attempt_timeout,
                fetcher.fetch(request.clone()),
            ) => match attempted {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(options.attempt_timeout)),
            },
        };

        match outcome {
            Ok(bytes) => return Ok(bytes),
            Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
            Err(error) => match options.retry.next_delay(attempt, &error) {
                Some(delay) => {
                    warn!(attempt, ?delay, %error, "tile fetch failed, retrying");
                    tokio::select! {
                        _ = options.cancel.cancelled() => return Err(FetchError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
                None => return Err(error),
            },
        }
    }
}
