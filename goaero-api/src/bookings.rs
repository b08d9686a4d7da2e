use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use goaero_core::{Booking, Session};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConfirmBookingRequest {
    pub flight_id: Uuid,
}

/// Routes that require a session; the caller layers the auth middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", get(list_bookings).post(confirm_booking))
        .route("/v1/bookings/{pnr}", get(get_booking))
}

async fn confirm_booking(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    payload: Result<Json<ConfirmBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let Json(req) = payload?;
    let flight = state
        .flights
        .get_flight(req.flight_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Flight {} not found", req.flight_id)))?;

    let booking = state.workflow.confirm_booking(&session, &flight).await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.bookings.list_for_user(session.user_id).await?;
    Ok(Json(bookings))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(pnr): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let pnr = pnr.to_ascii_uppercase();
    match state.bookings.find_by_pnr(&pnr).await? {
        // Someone else's booking is reported the same as a missing one
        Some(booking) if booking.user_id == session.user_id => Ok(Json(booking)),
        _ => Err(AppError::NotFoundError(format!("Booking {} not found", pnr))),
    }
}
