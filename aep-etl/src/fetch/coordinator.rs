//! Extraction coordinator
//!
//! Drives one fetch-and-parse per country with bounded retries, a shared
//! polite throttle spacing every request to the portal, and a placeholder
//! row on exhaustion. The batch entry point fans countries out concurrently
//! under a ceiling; each country's attempt sequence stays strictly serial,
//! every task returns its own rows (no shared accumulator), and the one
//! limiter keeps the fan-out from stampeding the host.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use super::{PayloadFetcher, PoliteDelay};
use crate::parser::parse_portal_payload;
use aep_common::config::Settings;
use aep_common::types::RawMetricRow;

/// Fixed delay between failed attempts for the same country.
const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Jitter added on top of the configured throttle, in milliseconds.
const THROTTLE_JITTER_MS: u64 = 300;

pub struct ExtractionCoordinator<F> {
    fetcher: F,
    max_retries: u32,
    attempt_timeout: Duration,
    limiter: PoliteDelay,
    concurrency: usize,
    /// Source link recorded on placeholder rows (the data endpoint URL).
    error_link: String,
}

impl<F: PayloadFetcher> ExtractionCoordinator<F> {
    pub fn new(fetcher: F, settings: &Settings) -> Self {
        Self {
            fetcher,
            max_retries: settings.max_retries.max(1),
            attempt_timeout: Duration::from_secs(settings.fetch_timeout_secs),
            limiter: PoliteDelay::new(
                Duration::from_millis(settings.throttle_ms),
                THROTTLE_JITTER_MS,
            ),
            concurrency: settings.concurrency.max(1),
            error_link: format!("{}/get-country-data", settings.base_url.trim_end_matches('/')),
        }
    }

    /// Extract every requested country concurrently (bounded) and collect
    /// the combined rows. Completion order is not request order; downstream
    /// stages do not depend on row order.
    ///
    /// Totality: every requested country contributes at least one row,
    /// either parsed data or exactly one placeholder.
    pub async fn extract_all(&self, countries: &[String]) -> Vec<RawMetricRow> {
        let per_country: Vec<Vec<RawMetricRow>> = stream::iter(countries)
            .map(|country| self.extract_country(country))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        per_country.into_iter().flatten().collect()
    }

    /// Extract one country: serial attempts up to the retry budget, then
    /// downgrade to a single placeholder row. Never returns an error and
    /// never returns zero rows for a country with no metrics published
    /// (an empty payload still parses to an empty row set; the validator
    /// reports the country as missing).
    pub async fn extract_country(&self, country: &str) -> Vec<RawMetricRow> {
        for attempt in 1..=self.max_retries {
            self.limiter.wait().await;

            match tokio::time::timeout(self.attempt_timeout, self.fetcher.fetch(country)).await {
                Ok(Ok(fetched)) => {
                    let rows = parse_portal_payload(&fetched.items, country, &fetched.url);
                    info!(country = %country, rows = rows.len(), attempt, "Collected rows");
                    return rows;
                }
                Ok(Err(err)) => {
                    warn!(country = %country, attempt, error = %err, "Fetch attempt failed");
                }
                Err(_) => {
                    warn!(
                        country = %country,
                        attempt,
                        timeout_secs = self.attempt_timeout.as_secs(),
                        "Fetch attempt timed out"
                    );
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }

        error!(
            country = %country,
            attempts = self.max_retries,
            "Extraction exhausted, emitting placeholder row"
        );
        vec![RawMetricRow::error_placeholder(country, &self.error_link)]
    }
}
