use std::time::Duration;

use anyhow::{Context, ensure};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::{FetchError, ForecastFetcher};
use crate::domain::LocationKey;

pub const DEFAULT_BASE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";

/// Client for the Visual Crossing timeline API
#[derive(Debug, Clone)]
pub struct VisualCrossing {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl VisualCrossing {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).context("Invalid upstream base url")?;
        ensure!(
            !base_url.cannot_be_a_base(),
            "Upstream base url {base_url} cannot take a path"
        );

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build http client")?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    fn request_url(&self, location: &LocationKey) -> Url {
        let mut url = self.base_url.clone();
        // checked in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(location.as_str());
        }
        url.query_pairs_mut()
            .append_pair("unitGroup", "metric")
            .append_pair("include", "days")
            .append_pair("key", &self.api_key)
            .append_pair("contentType", "json");
        url
    }
}

// the request url carries the api key, keep it out of error messages
fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Unavailable(e.without_url().to_string())
    }
}

#[async_trait]
impl ForecastFetcher for VisualCrossing {
    #[tracing::instrument(name = "provider::visual_crossing::fetch", skip(self))]
    async fn fetch(&self, location: &LocationKey) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(self.request_url(location))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(transport_error)?;

        Ok(body.to_vec())
    }
}
