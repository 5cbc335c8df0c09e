use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::sync::Arc;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(|| async { "Seat Reservation API v1.0" }))
        .route("/health", get(health))
}

async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.reservations.store().count().await {
        Ok(_) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::error!("health check failed: {:?}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable")
        }
    }
}
