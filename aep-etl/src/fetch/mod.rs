//! Payload extraction: fetcher seam, portal client, retry coordinator

mod coordinator;
mod portal;

pub use coordinator::ExtractionCoordinator;
pub use portal::PortalClient;

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces requests to the shared portal host. One instance covers all
/// fan-out tasks: a mutex-guarded last-request instant enforces at least
/// the base interval plus a fresh random jitter between any two requests,
/// whichever task issues them.
pub(crate) struct PoliteDelay {
    last_request: Mutex<Option<Instant>>,
    base_interval: Duration,
    jitter_ms: u64,
}

impl PoliteDelay {
    pub(crate) fn new(base_interval: Duration, jitter_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            base_interval,
            jitter_ms,
        }
    }

    /// Wait for the next request slot, then claim it. The lock is held
    /// across the sleep so concurrent waiters line up instead of firing
    /// together once the interval elapses.
    pub(crate) async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let jitter = rand::thread_rng().gen_range(0..=self.jitter_ms);
            let interval = self.base_interval + Duration::from_millis(jitter);
            let elapsed = last_time.elapsed();
            if elapsed < interval {
                tracing::debug!("Throttling: waiting {:?}", interval - elapsed);
                tokio::time::sleep(interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Fetch failures. All classes are currently retried identically; the
/// variants exist so a fatal-fast class can be carved out later without
/// reshaping the coordinator.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Portal returned status {0}: {1}")]
    Status(u16, String),

    #[error("Unusable payload: {0}")]
    Payload(String),
}

/// Raw payload for one country plus the URL it resolved from.
#[derive(Debug, Clone)]
pub struct FetchedPayload {
    /// Opaque metric items, one per (metric, source) pair.
    pub items: Vec<Value>,
    /// Resolved data URL, recorded on every row as the source link.
    pub url: String,
}

/// Seam between the coordinator and the mechanics of obtaining a payload.
/// The shipped implementation is a plain HTTP client; tests substitute
/// scripted fetchers.
#[async_trait]
pub trait PayloadFetcher: Send + Sync {
    async fn fetch(&self, country: &str) -> Result<FetchedPayload, FetchError>;
}
