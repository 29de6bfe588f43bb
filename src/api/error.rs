use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{domain::LocationKeyError, resolver::ResolveError};

#[derive(Debug)]
pub struct ApiError {
    status_code: StatusCode,
    reason: &'static str,
}

#[derive(Deserialize, Serialize)]
struct ApiErrorBody(&'static str);

impl ApiError {
    pub fn public(status_code: StatusCode, reason: &'static str) -> Self {
        Self {
            status_code,
            reason,
        }
    }
}

impl From<LocationKeyError> for ApiError {
    fn from(error: LocationKeyError) -> Self {
        match error {
            LocationKeyError::Empty => Self::public(StatusCode::BAD_REQUEST, "Location is empty"),
            LocationKeyError::TooLong => {
                Self::public(StatusCode::BAD_REQUEST, "Location is too long")
            }
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::UpstreamUnavailable(_) => Self::public(
                StatusCode::SERVICE_UNAVAILABLE,
                "Weather provider is unavailable",
            ),
            ResolveError::UpstreamBadResponse(_) => Self::public(
                StatusCode::BAD_GATEWAY,
                "Weather provider could not answer for this location",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code, Json(ApiErrorBody(self.reason))).into_response()
    }
}
