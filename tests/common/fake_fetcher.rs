use std::{collections::HashMap, sync::Mutex, time::Duration};

use async_trait::async_trait;
use forecast_cache::{
    domain::LocationKey,
    provider::{FetchError, ForecastFetcher},
};

#[derive(Clone)]
pub enum Reply {
    Body(Vec<u8>),
    Status(u16),
    Unreachable,
    Timeout,
}

/// Scripted upstream, locations without a reply are unreachable
#[derive(Default)]
pub struct FakeFetcher {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch sleeps `delay` on the tokio clock before answering
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn reply(&self, location: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .insert(location.to_string(), reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForecastFetcher for FakeFetcher {
    async fn fetch(&self, location: &LocationKey) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().unwrap().push(location.as_str().to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(location.as_str())
            .cloned()
            .unwrap_or(Reply::Unreachable);

        match reply {
            Reply::Body(body) => Ok(body),
            Reply::Status(code) => Err(FetchError::BadStatus(code)),
            Reply::Unreachable => Err(FetchError::Unavailable("connection refused".to_string())),
            Reply::Timeout => Err(FetchError::Timeout),
        }
    }
}
