mod visual_crossing;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::LocationKey;

pub use visual_crossing::{DEFAULT_BASE_URL, VisualCrossing};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream unreachable: {0}")]
    Unavailable(String),
    #[error("upstream timed out")]
    Timeout,
    #[error("upstream answered with status {0}")]
    BadStatus(u16),
}

/// Capability to fetch the raw forecast payload for a location
#[async_trait]
pub trait ForecastFetcher: Send + Sync {
    async fn fetch(&self, location: &LocationKey) -> Result<Vec<u8>, FetchError>;
}
