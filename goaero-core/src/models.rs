use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Airport {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub city: String,
}

impl Airport {
    pub fn new(code: &str, name: &str, city: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
            city: city.to_string(),
        }
    }
}

/// A scheduled flight as stored in the directory.
///
/// Available seats are never stored here; they are derived from the
/// confirmed bookings against `capacity` whenever they are needed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flight {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub airline_name: String,
    pub airline_code: String,
    pub departure_airport_id: Uuid,
    pub destination_airport_id: Uuid,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub price_amount: i32,
    pub price_currency: String,
    pub capacity: i32,
}

/// A search hit: the flight plus a seat count computed at query time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlightOption {
    #[serde(flatten)]
    pub flight: Flight,
    pub available_seats: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(CoreError::UnknownVariant {
                kind: "payment status",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle state of a reservation, independent of payment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Pending,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Pending => "PENDING",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "PENDING" => Ok(BookingStatus::Pending),
            other => Err(CoreError::UnknownVariant {
                kind: "booking status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub departure_airport_id: Uuid,
    pub destination_airport_id: Uuid,
    pub departure_time: DateTime<Utc>,
    pub destination_time: DateTime<Utc>,
    pub pnr: String,
    pub booking_date: DateTime<Utc>,
    pub amount: i32,
    pub currency: String,
    pub payment_status: PaymentStatus,
    pub booking_status: BookingStatus,
}

impl Booking {
    /// Build a fresh booking from a flight snapshot.
    ///
    /// Route, times and price are copied from `flight` as given; nothing is
    /// re-read from the directory. The booking starts CONFIRMED with payment
    /// PENDING.
    pub fn from_flight(user_id: Uuid, flight: &Flight, pnr: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            flight_id: flight.id,
            departure_airport_id: flight.departure_airport_id,
            destination_airport_id: flight.destination_airport_id,
            departure_time: flight.departure_time,
            destination_time: flight.arrival_time,
            pnr,
            booking_date: Utc::now(),
            amount: flight.price_amount,
            currency: flight.price_currency.clone(),
            payment_status: PaymentStatus::Pending,
            booking_status: BookingStatus::Confirmed,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.booking_status == BookingStatus::Confirmed
    }
}
