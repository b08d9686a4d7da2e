use serde::Deserialize;
use uuid::Uuid;
use chrono::NaiveDate;

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct FlightSearchRequest {
    pub departure_airport_id: Option<Uuid>,
    pub destination_airport_id: Option<Uuid>,
    pub date: NaiveDate, // Just date, ignore time for search match
}

/// A search request that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidSearch {
    pub departure_airport_id: Uuid,
    pub destination_airport_id: Uuid,
    pub date: NaiveDate,
}

impl FlightSearchRequest {
    pub fn new(departure_airport_id: Uuid, destination_airport_id: Uuid, date: NaiveDate) -> Self {
        Self {
            departure_airport_id: Some(departure_airport_id),
            destination_airport_id: Some(destination_airport_id),
            date,
        }
    }

    /// Check the request against `today`. Nothing here touches a directory.
    pub fn validate(&self, today: NaiveDate) -> CoreResult<ValidSearch> {
        let (departure, destination) = match (self.departure_airport_id, self.destination_airport_id) {
            (Some(d), Some(a)) => (d, a),
            _ => {
                return Err(CoreError::ValidationError(
                    "Please select both departure and destination airports".to_string(),
                ))
            }
        };

        if departure == destination {
            return Err(CoreError::ValidationError(
                "Departure and destination airports cannot be the same".to_string(),
            ));
        }

        if self.date < today {
            return Err(CoreError::ValidationError(format!(
                "Travel date {} is in the past",
                self.date
            )));
        }

        Ok(ValidSearch {
            departure_airport_id: departure,
            destination_airport_id: destination,
            date: self.date,
        })
    }
}
