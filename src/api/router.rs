use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{api::handlers, app::AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/weather/{location}", get(handlers::forecast))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
