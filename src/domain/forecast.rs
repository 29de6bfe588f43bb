use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Forecast for a location, the unit that is cached and returned to callers
///
/// The serialized form is the cache wire format. `location_key` doubles as
/// the cache key and as the identity checked on every cache hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRecord {
    pub location_key: String,
    pub days: Vec<DayRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub date: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub conditions: String,
    pub uv_index: f64,
}

impl ForecastRecord {
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[derive(Error, Debug)]
pub enum UpstreamPayloadError {
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("payload carries no address")]
    MissingAddress,
}

/// Timeline payload as sent by the upstream provider
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamForecast {
    resolved_address: Option<String>,
    address: Option<String>,
    days: Vec<UpstreamDay>,
}

#[derive(Debug, Deserialize)]
struct UpstreamDay {
    datetime: String,
    tempmax: f64,
    tempmin: f64,
    conditions: String,
    uvindex: f64,
}

impl UpstreamForecast {
    pub fn parse(body: &[u8]) -> Result<ForecastRecord, UpstreamPayloadError> {
        let payload: UpstreamForecast = serde_json::from_slice(body)?;
        payload.try_into()
    }
}

impl TryFrom<UpstreamForecast> for ForecastRecord {
    type Error = UpstreamPayloadError;

    fn try_from(payload: UpstreamForecast) -> Result<Self, Self::Error> {
        // the resolved address is the normalized one, the plain address echoes the request
        let location_key = payload
            .resolved_address
            .filter(|a| !a.is_empty())
            .or(payload.address.filter(|a| !a.is_empty()))
            .ok_or(UpstreamPayloadError::MissingAddress)?;

        let days = payload
            .days
            .into_iter()
            .map(|d| DayRecord {
                date: d.datetime,
                temp_max: d.tempmax,
                temp_min: d.tempmin,
                conditions: d.conditions,
                uv_index: d.uvindex,
            })
            .collect();

        Ok(ForecastRecord { location_key, days })
    }
}
