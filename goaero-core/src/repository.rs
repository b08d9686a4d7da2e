use async_trait::async_trait;
use uuid::Uuid;
use chrono::NaiveDate;

use crate::models::{Airport, Booking, Flight};

/// Failures reported by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Flight {0} has no remaining capacity")]
    CapacityExceeded(Uuid),

    #[error("Reservation code already in use: {0}")]
    DuplicatePnr(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository trait for airport data access
#[async_trait]
pub trait AirportDirectory: Send + Sync {
    async fn list_airports(&self) -> StoreResult<Vec<Airport>>;
}

/// Repository trait for flight data access
#[async_trait]
pub trait FlightDirectory: Send + Sync {
    async fn search_flights(
        &self,
        departure_airport_id: Uuid,
        destination_airport_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<Flight>>;

    async fn get_flight(&self, id: Uuid) -> StoreResult<Option<Flight>>;

    /// Capacity minus confirmed bookings, computed at call time.
    async fn available_seats(&self, flight_id: Uuid) -> StoreResult<i32>;
}

/// Repository trait for booking persistence
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persist a booking. Backends must reject a duplicate PNR and a booking
    /// against a flight with no remaining capacity.
    async fn create(&self, booking: Booking) -> StoreResult<Booking>;

    async fn pnr_exists(&self, pnr: &str) -> StoreResult<bool>;

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Booking>>;

    async fn find_by_pnr(&self, pnr: &str) -> StoreResult<Option<Booking>>;
}

/// Produces candidate reservation codes. Candidates are not guaranteed
/// unique; callers verify them against a [`BookingStore`].
pub trait PnrGenerator: Send + Sync {
    fn generate(&self, airline_code: &str) -> String;
}
