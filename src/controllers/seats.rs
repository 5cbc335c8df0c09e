use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::services::reservation::ReservationError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seats", get(get_seats))
        .route("/reserve", post(reserve_seats))
        .route("/reset", post(reset_seats))
}

const INVALID_COUNT: &str = "Invalid number of seats.";
const NOT_ENOUGH: &str = "Not enough seats available.";

impl IntoResponse for ReservationError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ReservationError::InvalidRequest => (StatusCode::BAD_REQUEST, INVALID_COUNT),
            ReservationError::InsufficientSeats => (StatusCode::BAD_REQUEST, NOT_ENOUGH),
            ReservationError::Contention { .. } => (
                StatusCode::CONFLICT,
                "Seats are being reserved concurrently, try again.",
            ),
            ReservationError::Store(e) => {
                tracing::error!("reserve store error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error reserving seats.")
            }
        };
        (status, message).into_response()
    }
}

/* ---------- SEATS ---------- */

// GET /seats
async fn get_seats(State(state): State<Arc<AppState>>) -> Result<Response, (StatusCode, &'static str)> {
    match state.cache.get_cached_seats().await {
        Ok(Some(cached)) => return Ok(json_body(cached, Some("HIT"))),
        Ok(None) => {}
        Err(e) => tracing::warn!("seats cache read failed: {:?}", e),
    }

    // Taken before the store read so a booking that lands in between
    // keeps this snapshot out of the cache.
    let ticket = state.cache.seats_ticket().await;
    if let Err(e) = &ticket {
        tracing::warn!("seats cache version read failed: {:?}", e);
    }

    let seats = state.reservations.list_seats().await.map_err(|e| {
        tracing::error!("get_seats store error: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching seats.")
    })?;

    let body = serde_json::to_string(&seats).map_err(|e| {
        tracing::error!("get_seats serialization error: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching seats.")
    })?;

    if let Ok(ticket) = ticket {
        if let Err(e) = state.cache.cache_seats(ticket, &body).await {
            tracing::warn!("seats cache write failed: {:?}", e);
        }
    }

    let cache_header = state.cache.is_enabled().then_some("MISS");
    Ok(json_body(body, cache_header))
}

fn json_body(body: String, cache: Option<&'static str>) -> Response {
    let mut response = (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response();
    if let Some(value) = cache {
        response
            .headers_mut()
            .insert("x-cache", HeaderValue::from_static(value));
    }
    response
}

/* ---------- RESERVATIONS ---------- */

#[derive(Debug, Deserialize, Validate)]
struct ReserveRequest {
    #[serde(rename = "numSeats")]
    #[validate(range(min = 1, max = 7))]
    num_seats: u32,
}

// POST /reserve
async fn reserve_seats(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReserveRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ReservationError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!("reserve body rejected: {}", e);
        ReservationError::InvalidRequest
    })?;
    req.validate().map_err(|_| ReservationError::InvalidRequest)?;

    let booked = state.reservations.reserve(req.num_seats).await?;
    Ok((StatusCode::OK, Json(booked)))
}

// POST /reset
async fn reset_seats(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    tracing::warn!("RESET: setting every seat back to available");
    match state.reservations.reset().await {
        Ok(_) => (StatusCode::OK, "All seats have been reset."),
        Err(e) => {
            tracing::error!("RESET: store error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error resetting seats.")
        }
    }
}
