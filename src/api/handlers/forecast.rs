use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    api::error::ApiError,
    app::AppState,
    domain::{ForecastRecord, LocationKey},
};

pub async fn forecast(
    State(app): State<AppState>,
    Path(location): Path<String>,
) -> Result<Json<ForecastRecord>, ApiError> {
    let key: LocationKey = location.try_into().map_err(|e| {
        tracing::debug!(error = %e, "location parse error");
        ApiError::from(e)
    })?;

    let record = app.resolver.resolve(&key).await?;

    Ok(Json(record))
}
