mod forecast;
mod location;

pub use forecast::{DayRecord, ForecastRecord, UpstreamForecast, UpstreamPayloadError};
pub use location::{LocationKey, LocationKeyError, MAX_LOCATION_LENGTH};
