//! HTTP client for the portal's country-data endpoint

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{FetchError, FetchedPayload, PayloadFetcher};
use aep_common::slug::country_url_segment;

const USER_AGENT: &str = concat!("aep-etl/", env!("CARGO_PKG_VERSION"));
const DATA_ENDPOINT: &str = "get-country-data";

/// Client for the portal's `/get-country-data` endpoint.
pub struct PortalClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl PortalClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Data URL for one country; recorded as the source link on parsed rows.
    pub fn data_url(&self) -> String {
        format!("{}/{}", self.base_url, DATA_ENDPOINT)
    }
}

#[async_trait]
impl PayloadFetcher for PortalClient {
    async fn fetch(&self, country: &str) -> Result<FetchedPayload, FetchError> {
        let url = self.data_url();
        let referer = format!("{}/country/{}", self.base_url, country_url_segment(country));

        debug!(country = %country, url = %url, "Requesting country data");

        let response = self
            .http_client
            .post(&url)
            .header(reqwest::header::REFERER, &referer)
            .json(&serde_json::json!({ "country": country }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status(status.as_u16(), body));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| FetchError::Payload(e.to_string()))?;

        let items = payload
            .as_array()
            .cloned()
            .ok_or_else(|| FetchError::Payload("expected a JSON array of metric items".into()))?;

        Ok(FetchedPayload { items, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_and_normalizes_base_url() {
        let client =
            PortalClient::new("https://portal.test/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.data_url(), "https://portal.test/get-country-data");
    }
}
