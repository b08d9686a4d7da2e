use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use goaero_core::repository::{AirportDirectory, BookingStore, FlightDirectory, StoreError, StoreResult};
use goaero_core::{Airport, Booking, Flight};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    airports: Vec<Airport>,
    flights: HashMap<Uuid, Flight>,
    bookings: Vec<Booking>,
}

impl Tables {
    fn confirmed_count(&self, flight_id: Uuid) -> i32 {
        self.bookings
            .iter()
            .filter(|b| b.flight_id == flight_id && b.is_confirmed())
            .count() as i32
    }
}

/// Process-local store backing all three collaborator traits.
///
/// `create` checks PNR uniqueness and remaining capacity under a single write
/// lock, so concurrent bookings for the last seat cannot both succeed.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_airport(&self, airport: Airport) {
        self.tables.write().await.airports.push(airport);
    }

    pub async fn add_flight(&self, flight: Flight) {
        self.tables.write().await.flights.insert(flight.id, flight);
    }

    pub async fn booking_count(&self) -> usize {
        self.tables.read().await.bookings.len()
    }

    /// A few airports and next-day flights for running the service without
    /// a database.
    pub async fn seed_demo(&self) {
        let airports = [
            Airport::new("BOM", "Chhatrapati Shivaji Maharaj International", "Mumbai"),
            Airport::new("DEL", "Indira Gandhi International", "Delhi"),
            Airport::new("BLR", "Kempegowda International", "Bengaluru"),
        ];
        let tomorrow = (Utc::now() + Duration::days(1)).date_naive();
        let at = |hour: u32| Utc.from_utc_datetime(&tomorrow.and_time(NaiveTime::MIN)) + Duration::hours(hour as i64);

        let routes = [
            ("GA101", 0usize, 1usize, 6u32, 4500, 120),
            ("GA102", 1, 0, 9, 4700, 120),
            ("GA201", 0, 2, 7, 3900, 90),
            ("GA202", 2, 1, 18, 5200, 2),
        ];
        for (code, from, to, hour, price, capacity) in routes {
            self.add_flight(Flight {
                id: Uuid::new_v4(),
                code: code.to_string(),
                name: format!("GoAero {}", &code[2..]),
                airline_name: "GoAero".to_string(),
                airline_code: "GA".to_string(),
                departure_airport_id: airports[from].id,
                destination_airport_id: airports[to].id,
                departure_time: at(hour),
                arrival_time: at(hour + 2),
                price_amount: price,
                price_currency: "INR".to_string(),
                capacity,
            })
            .await;
        }
        for airport in airports {
            self.add_airport(airport).await;
        }
    }
}

#[async_trait]
impl AirportDirectory for InMemoryStore {
    async fn list_airports(&self) -> StoreResult<Vec<Airport>> {
        let mut airports = self.tables.read().await.airports.clone();
        airports.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(airports)
    }
}

#[async_trait]
impl FlightDirectory for InMemoryStore {
    async fn search_flights(
        &self,
        departure_airport_id: Uuid,
        destination_airport_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<Flight>> {
        let tables = self.tables.read().await;
        let mut flights: Vec<Flight> = tables
            .flights
            .values()
            .filter(|f| {
                f.departure_airport_id == departure_airport_id
                    && f.destination_airport_id == destination_airport_id
                    && f.departure_time.date_naive() == date
            })
            .cloned()
            .collect();
        flights.sort_by_key(|f| f.departure_time);
        Ok(flights)
    }

    async fn get_flight(&self, id: Uuid) -> StoreResult<Option<Flight>> {
        Ok(self.tables.read().await.flights.get(&id).cloned())
    }

    async fn available_seats(&self, flight_id: Uuid) -> StoreResult<i32> {
        let tables = self.tables.read().await;
        let flight = tables
            .flights
            .get(&flight_id)
            .ok_or_else(|| StoreError::NotFound(format!("flight {}", flight_id)))?;
        Ok((flight.capacity - tables.confirmed_count(flight_id)).max(0))
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn create(&self, booking: Booking) -> StoreResult<Booking> {
        let mut tables = self.tables.write().await;

        let capacity = tables
            .flights
            .get(&booking.flight_id)
            .map(|f| f.capacity)
            .ok_or_else(|| StoreError::NotFound(format!("flight {}", booking.flight_id)))?;

        if tables.bookings.iter().any(|b| b.pnr == booking.pnr) {
            return Err(StoreError::DuplicatePnr(booking.pnr));
        }

        if booking.is_confirmed() && tables.confirmed_count(booking.flight_id) >= capacity {
            warn!("Rejecting booking {}: flight {} is at capacity", booking.pnr, booking.flight_id);
            return Err(StoreError::CapacityExceeded(booking.flight_id));
        }

        tables.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn pnr_exists(&self, pnr: &str) -> StoreResult<bool> {
        Ok(self.tables.read().await.bookings.iter().any(|b| b.pnr == pnr))
    }

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .tables
            .read()
            .await
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
        Ok(bookings)
    }

    async fn find_by_pnr(&self, pnr: &str) -> StoreResult<Option<Booking>> {
        Ok(self.tables.read().await.bookings.iter().find(|b| b.pnr == pnr).cloned())
    }
}
