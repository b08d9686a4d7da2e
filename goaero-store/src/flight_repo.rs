use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use goaero_core::repository::{AirportDirectory, FlightDirectory, StoreResult};
use goaero_core::{Airport, Flight};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::store_error;

pub struct PostgresFlightRepository {
    pool: PgPool,
}

impl PostgresFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AirportRow {
    id: Uuid,
    code: String,
    name: String,
    city: String,
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    code: String,
    name: String,
    airline_name: String,
    airline_code: String,
    departure_airport_id: Uuid,
    destination_airport_id: Uuid,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    price_amount: i32,
    price_currency: String,
    capacity: i32,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            id: row.id,
            code: row.code,
            name: row.name,
            airline_name: row.airline_name,
            airline_code: row.airline_code,
            departure_airport_id: row.departure_airport_id,
            destination_airport_id: row.destination_airport_id,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            price_amount: row.price_amount,
            price_currency: row.price_currency,
            capacity: row.capacity,
        }
    }
}

const FLIGHT_COLUMNS: &str = r#"
    id, code, name, airline_name, airline_code,
    departure_airport_id, destination_airport_id,
    departure_time, arrival_time,
    price_amount, price_currency, capacity
"#;

#[async_trait]
impl AirportDirectory for PostgresFlightRepository {
    async fn list_airports(&self) -> StoreResult<Vec<Airport>> {
        let rows: Vec<AirportRow> = sqlx::query_as("SELECT id, code, name, city FROM airports ORDER BY code")
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(rows
            .into_iter()
            .map(|r| Airport { id: r.id, code: r.code, name: r.name, city: r.city })
            .collect())
    }
}

#[async_trait]
impl FlightDirectory for PostgresFlightRepository {
    async fn search_flights(
        &self,
        departure_airport_id: Uuid,
        destination_airport_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<Flight>> {
        let sql = format!(
            r#"
            SELECT {FLIGHT_COLUMNS}
            FROM flights
            WHERE
                departure_airport_id = $1
                AND destination_airport_id = $2
                AND DATE(departure_time AT TIME ZONE 'UTC') = $3
            ORDER BY departure_time
            "#
        );

        let rows: Vec<FlightRow> = sqlx::query_as(&sql)
            .bind(departure_airport_id)
            .bind(destination_airport_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn get_flight(&self, id: Uuid) -> StoreResult<Option<Flight>> {
        let sql = format!("SELECT {FLIGHT_COLUMNS} FROM flights WHERE id = $1");

        let row: Option<FlightRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(row.map(Flight::from))
    }

    async fn available_seats(&self, flight_id: Uuid) -> StoreResult<i32> {
        // Always counted from bookings; there is no stored seat counter.
        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT f.capacity::BIGINT - COUNT(b.id) FILTER (WHERE b.booking_status = 'CONFIRMED')
            FROM flights f
            LEFT JOIN bookings b ON b.flight_id = f.id
            WHERE f.id = $1
            GROUP BY f.capacity
            "#,
        )
        .bind(flight_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        match remaining {
            Some(count) => Ok(count.max(0) as i32),
            None => Err(goaero_core::StoreError::NotFound(format!("flight {}", flight_id))),
        }
    }
}
