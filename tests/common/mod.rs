#![allow(dead_code)]

mod fake_fetcher;
mod fake_store;

pub use fake_fetcher::{FakeFetcher, Reply};
pub use fake_store::FakeStore;

use std::sync::Arc;

use forecast_cache::{
    domain::{DayRecord, ForecastRecord, LocationKey},
    resolver::Resolver,
};
use serde_json::json;

pub fn key(s: &str) -> LocationKey {
    LocationKey::parse(s).unwrap()
}

pub fn resolver(store: &Arc<FakeStore>, fetcher: &Arc<FakeFetcher>) -> Resolver {
    Resolver::new(store.clone(), fetcher.clone())
}

pub fn day(date: &str, max: f64, min: f64) -> DayRecord {
    DayRecord {
        date: date.to_string(),
        temp_max: max,
        temp_min: min,
        conditions: "Partially cloudy".to_string(),
        uv_index: 5.0,
    }
}

pub fn record(location_key: &str) -> ForecastRecord {
    ForecastRecord {
        location_key: location_key.to_string(),
        days: vec![day("2024-05-01", 21.4, 9.1), day("2024-05-02", 18.0, 7.5)],
    }
}

/// Upstream timeline body for `record`, with `address` echoing the request
pub fn upstream_body(address: &str, record: &ForecastRecord) -> Vec<u8> {
    let days: Vec<_> = record
        .days
        .iter()
        .map(|d| {
            json!({
                "datetime": d.date,
                "tempmax": d.temp_max,
                "tempmin": d.temp_min,
                "conditions": d.conditions,
                "uvindex": d.uv_index,
                "precip": 0.0,
            })
        })
        .collect();

    serde_json::to_vec(&json!({
        "queryCost": 1,
        "resolvedAddress": record.location_key,
        "address": address,
        "timezone": "Europe/Berlin",
        "days": days,
    }))
    .unwrap()
}
