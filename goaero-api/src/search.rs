use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use goaero_core::{Airport, FlightOption, FlightSearchRequest};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/airports", get(list_airports))
        .route("/v1/flights/search", post(search_flights))
}

async fn list_airports(State(state): State<AppState>) -> Json<Vec<Airport>> {
    Json(state.search.list_airports().await)
}

async fn search_flights(
    State(state): State<AppState>,
    payload: Result<Json<FlightSearchRequest>, JsonRejection>,
) -> Result<Json<Vec<FlightOption>>, AppError> {
    let Json(req) = payload?;
    let options = state.search.search(&req).await?;
    Ok(Json(options))
}
