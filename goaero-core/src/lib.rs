pub mod models;
pub mod search;
pub mod repository;
pub mod session;

pub use models::{Airport, Booking, BookingStatus, Flight, FlightOption, PaymentStatus};
pub use repository::{AirportDirectory, BookingStore, FlightDirectory, PnrGenerator, StoreError};
pub use search::{FlightSearchRequest, ValidSearch};
pub use session::{Role, Session};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
