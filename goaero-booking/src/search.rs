use chrono::{NaiveDate, Utc};
use goaero_core::repository::{AirportDirectory, FlightDirectory, StoreError};
use goaero_core::{Airport, CoreError, FlightOption, FlightSearchRequest};
use std::sync::Arc;
use tracing::{info, warn};

pub struct SearchService {
    airports: Arc<dyn AirportDirectory>,
    flights: Arc<dyn FlightDirectory>,
}

impl SearchService {
    pub fn new(airports: Arc<dyn AirportDirectory>, flights: Arc<dyn FlightDirectory>) -> Self {
        Self { airports, flights }
    }

    /// Airport list for the selection boxes. A directory failure is logged
    /// and yields an empty list.
    pub async fn list_airports(&self) -> Vec<Airport> {
        match self.airports.list_airports().await {
            Ok(airports) => airports,
            Err(e) => {
                warn!("Failed to load airports, continuing with an empty list: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn search(&self, request: &FlightSearchRequest) -> Result<Vec<FlightOption>, SearchError> {
        self.search_as_of(request, Utc::now().date_naive()).await
    }

    /// Same as [`SearchService::search`] with an explicit notion of today.
    pub async fn search_as_of(
        &self,
        request: &FlightSearchRequest,
        today: NaiveDate,
    ) -> Result<Vec<FlightOption>, SearchError> {
        let valid = request.validate(today)?;

        let flights = self
            .flights
            .search_flights(valid.departure_airport_id, valid.destination_airport_id, valid.date)
            .await?;

        let mut options = Vec::with_capacity(flights.len());
        for flight in flights {
            let available_seats = self.flights.available_seats(flight.id).await?;
            options.push(FlightOption { flight, available_seats });
        }

        info!(
            "Search {} -> {} on {} returned {} flight(s)",
            valid.departure_airport_id,
            valid.destination_airport_id,
            valid.date,
            options.len()
        );
        Ok(options)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error("Flight directory unavailable: {0}")]
    Directory(#[from] StoreError),
}
