use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goaero_core::repository::{BookingStore, StoreError, StoreResult};
use goaero_core::Booking;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::store_error;

const UNIQUE_VIOLATION: &str = "23505";

pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    flight_id: Uuid,
    departure_airport_id: Uuid,
    destination_airport_id: Uuid,
    departure_time: DateTime<Utc>,
    destination_time: DateTime<Utc>,
    pnr: String,
    booking_date: DateTime<Utc>,
    amount: i32,
    currency: String,
    payment_status: String,
    booking_status: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            flight_id: row.flight_id,
            departure_airport_id: row.departure_airport_id,
            destination_airport_id: row.destination_airport_id,
            departure_time: row.departure_time,
            destination_time: row.destination_time,
            pnr: row.pnr,
            booking_date: row.booking_date,
            amount: row.amount,
            currency: row.currency,
            payment_status: row
                .payment_status
                .parse()
                .map_err(|e: goaero_core::CoreError| StoreError::Backend(e.to_string()))?,
            booking_status: row
                .booking_status
                .parse()
                .map_err(|e: goaero_core::CoreError| StoreError::Backend(e.to_string()))?,
        })
    }
}

const BOOKING_COLUMNS: &str = r#"
    id, user_id, flight_id, departure_airport_id, destination_airport_id,
    departure_time, destination_time, pnr, booking_date,
    amount, currency, payment_status, booking_status
"#;

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn create(&self, booking: Booking) -> StoreResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        // Lock the flight row so concurrent creates for the same flight
        // serialize on the capacity check below.
        let capacity: Option<i32> = sqlx::query_scalar("SELECT capacity FROM flights WHERE id = $1 FOR UPDATE")
            .bind(booking.flight_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_error)?;

        let capacity = capacity.ok_or_else(|| StoreError::NotFound(format!("flight {}", booking.flight_id)))?;

        let confirmed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings WHERE flight_id = $1 AND booking_status = 'CONFIRMED'",
        )
        .bind(booking.flight_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_error)?;

        if booking.is_confirmed() && confirmed >= capacity as i64 {
            warn!("Rejecting booking {}: flight {} is at capacity", booking.pnr, booking.flight_id);
            return Err(StoreError::CapacityExceeded(booking.flight_id));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO bookings (
                id, user_id, flight_id, departure_airport_id, destination_airport_id,
                departure_time, destination_time, pnr, booking_date,
                amount, currency, payment_status, booking_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.flight_id)
        .bind(booking.departure_airport_id)
        .bind(booking.destination_airport_id)
        .bind(booking.departure_time)
        .bind(booking.destination_time)
        .bind(&booking.pnr)
        .bind(booking.booking_date)
        .bind(booking.amount)
        .bind(&booking.currency)
        .bind(booking.payment_status.as_str())
        .bind(booking.booking_status.as_str())
        .execute(&mut *tx)
        .await;

        if let Err(e) = result {
            let duplicate = e
                .as_database_error()
                .and_then(|db| db.code())
                .is_some_and(|code| code == UNIQUE_VIOLATION);
            if duplicate {
                return Err(StoreError::DuplicatePnr(booking.pnr));
            }
            return Err(store_error(e));
        }

        tx.commit().await.map_err(store_error)?;

        info!("Booking {} stored for flight {}", booking.pnr, booking.flight_id);
        Ok(booking)
    }

    async fn pnr_exists(&self, pnr: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bookings WHERE pnr = $1)")
            .bind(pnr)
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(exists)
    }

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY booking_date DESC");

        let rows: Vec<BookingRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn find_by_pnr(&self, pnr: &str) -> StoreResult<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE pnr = $1");

        let row: Option<BookingRow> = sqlx::query_as(&sql)
            .bind(pnr)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(Booking::try_from).transpose()
    }
}
