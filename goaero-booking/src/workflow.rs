use goaero_core::repository::{BookingStore, FlightDirectory, PnrGenerator, StoreError};
use goaero_core::{Booking, Flight, Session};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Bounds on the reservation-code search.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowLimits {
    pub pnr_max_attempts: u32,
    pub pnr_timeout: Duration,
}

impl Default for WorkflowLimits {
    fn default() -> Self {
        Self {
            pnr_max_attempts: 10,
            pnr_timeout: Duration::from_millis(2000),
        }
    }
}

/// Turns a flight selection into a persisted booking with a unique PNR.
///
/// Each call runs to exactly one outcome: the stored booking, a
/// [`BookingError::FlightFullyBooked`], or another failure. Seat counts are
/// re-read at confirmation time because the count a caller saw during search
/// may be stale. The seat check and the insert are not atomic here; the
/// store's `create` is expected to enforce capacity and PNR uniqueness.
pub struct BookingWorkflow {
    flights: Arc<dyn FlightDirectory>,
    bookings: Arc<dyn BookingStore>,
    pnr: Arc<dyn PnrGenerator>,
    limits: WorkflowLimits,
}

impl BookingWorkflow {
    pub fn new(
        flights: Arc<dyn FlightDirectory>,
        bookings: Arc<dyn BookingStore>,
        pnr: Arc<dyn PnrGenerator>,
        limits: WorkflowLimits,
    ) -> Self {
        Self { flights, bookings, pnr, limits }
    }

    pub async fn confirm_booking(&self, session: &Session, flight: &Flight) -> Result<Booking, BookingError> {
        if !flight.airline_code.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(BookingError::ValidationFailed(format!(
                "Flight {} has no operating airline code",
                flight.code
            )));
        }
        if flight.price_amount < 0 {
            return Err(BookingError::ValidationFailed(format!(
                "Flight {} has a negative price",
                flight.code
            )));
        }

        // 1. Re-check seats
        let seats = self.flights.available_seats(flight.id).await.map_err(|e| match e {
            StoreError::NotFound(what) => BookingError::ValidationFailed(format!("Unknown {}", what)),
            other => BookingError::DirectoryUnavailable(other),
        })?;

        if seats <= 0 {
            info!("Flight {} is fully booked, rejecting booking for user {}", flight.code, session.user_id);
            return Err(BookingError::FlightFullyBooked { flight_code: flight.code.clone() });
        }

        // 2. Find an unused reservation code
        let pnr = self.reserve_code(&flight.airline_code).await?;

        // 3. Build from the snapshot we were given
        let booking = Booking::from_flight(session.user_id, flight, pnr);

        // 4. Persist
        match self.bookings.create(booking).await {
            Ok(saved) => {
                info!("Booking confirmed: {} on {} for user {}", saved.pnr, flight.code, session.user_id);
                Ok(saved)
            }
            Err(StoreError::CapacityExceeded(_)) => {
                warn!("Lost the race for the last seat on {}", flight.code);
                Err(BookingError::FlightFullyBooked { flight_code: flight.code.clone() })
            }
            Err(e) => {
                error!("Failed to store booking on {}: {}", flight.code, e);
                Err(BookingError::BookingPersistFailed(e.to_string()))
            }
        }
    }

    async fn reserve_code(&self, airline_code: &str) -> Result<String, BookingError> {
        let mut attempts = 0u32;

        let search = async {
            while attempts < self.limits.pnr_max_attempts {
                attempts += 1;
                let candidate = self.pnr.generate(airline_code);
                let taken = match self.bookings.pnr_exists(&candidate).await {
                    Ok(taken) => taken,
                    Err(e) => return Err(BookingError::DirectoryUnavailable(e)),
                };

                if !taken {
                    debug!("Reservation code {} free after {} attempt(s)", candidate, attempts);
                    return Ok(candidate);
                }
                warn!("Reservation code collision on attempt {}: {}", attempts, candidate);
            }
            Err(BookingError::ReservationCodeExhausted { attempts: self.limits.pnr_max_attempts })
        };

        let result = tokio::time::timeout(self.limits.pnr_timeout, search).await;
        match result {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("Reservation code search timed out after {} attempt(s)", attempts);
                Err(BookingError::ReservationCodeExhausted { attempts })
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Flight {flight_code} is fully booked")]
    FlightFullyBooked { flight_code: String },

    #[error("No unused reservation code found after {attempts} attempt(s)")]
    ReservationCodeExhausted { attempts: u32 },

    #[error("Booking could not be saved: {0}")]
    BookingPersistFailed(String),

    #[error("Flight directory unavailable: {0}")]
    DirectoryUnavailable(#[source] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pnr::RandomPnrGenerator;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
    use goaero_core::repository::StoreResult;
    use goaero_core::{Airport, BookingStatus, PaymentStatus};
    use goaero_store::InMemoryStore;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Hands out a fixed sequence of codes and counts calls.
    struct ScriptedGenerator {
        codes: Mutex<VecDeque<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn new(codes: &[&str]) -> Self {
            Self {
                codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PnrGenerator for ScriptedGenerator {
        fn generate(&self, airline_code: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.codes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| format!("{}ZZZZ", airline_code))
        }
    }

    /// Wraps the in-memory store to pre-claim codes, count creates, and
    /// optionally refuse writes.
    struct ScriptedStore {
        inner: Arc<InMemoryStore>,
        taken: Vec<String>,
        creates: AtomicUsize,
        reject_creates: bool,
        lookup_delay: Option<std::time::Duration>,
    }

    impl ScriptedStore {
        fn new(inner: Arc<InMemoryStore>) -> Self {
            Self {
                inner,
                taken: Vec::new(),
                creates: AtomicUsize::new(0),
                reject_creates: false,
                lookup_delay: None,
            }
        }

        fn creates(&self) -> usize {
            self.creates.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BookingStore for ScriptedStore {
        async fn create(&self, booking: Booking) -> StoreResult<Booking> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            if self.reject_creates {
                return Err(StoreError::Backend("connection reset".to_string()));
            }
            self.inner.create(booking).await
        }

        async fn pnr_exists(&self, pnr: &str) -> StoreResult<bool> {
            if let Some(delay) = self.lookup_delay {
                tokio::time::sleep(delay).await;
            }
            if self.taken.iter().any(|t| t == pnr) {
                return Ok(true);
            }
            self.inner.pnr_exists(pnr).await
        }

        async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Booking>> {
            self.inner.list_for_user(user_id).await
        }

        async fn find_by_pnr(&self, pnr: &str) -> StoreResult<Option<Booking>> {
            self.inner.find_by_pnr(pnr).await
        }
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        flight: Flight,
    }

    async fn fixture(capacity: i32) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let lax = Airport::new("LAX", "Los Angeles International", "Los Angeles");
        let jfk = Airport::new("JFK", "John F. Kennedy International", "New York");

        let departure = Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(9, 30, 0).unwrap(),
        );
        let flight = Flight {
            id: Uuid::new_v4(),
            code: "GA101".to_string(),
            name: "GoAero 101".to_string(),
            airline_name: "GoAero".to_string(),
            airline_code: "GA".to_string(),
            departure_airport_id: lax.id,
            destination_airport_id: jfk.id,
            departure_time: departure,
            arrival_time: departure + ChronoDuration::hours(5),
            price_amount: 4500,
            price_currency: "INR".to_string(),
            capacity,
        };

        store.add_airport(lax).await;
        store.add_airport(jfk).await;
        store.add_flight(flight.clone()).await;

        Fixture { store, flight }
    }

    fn workflow(
        flights: Arc<InMemoryStore>,
        bookings: Arc<dyn BookingStore>,
        pnr: Arc<dyn PnrGenerator>,
        limits: WorkflowLimits,
    ) -> BookingWorkflow {
        BookingWorkflow::new(flights, bookings, pnr, limits)
    }

    fn passenger() -> Session {
        Session::new(Uuid::new_v4(), Some("asha@example.com".to_string()), goaero_core::Role::Passenger)
    }

    #[tokio::test]
    async fn test_successful_booking_copies_flight_and_claims_new_code() {
        let fx = fixture(10).await;
        let generator = Arc::new(ScriptedGenerator::new(&["GAQ7X2"]));
        let wf = workflow(fx.store.clone(), fx.store.clone(), generator.clone(), WorkflowLimits::default());
        let session = passenger();

        assert!(!fx.store.pnr_exists("GAQ7X2").await.unwrap());

        let booking = wf.confirm_booking(&session, &fx.flight).await.unwrap();

        assert_eq!(booking.pnr, "GAQ7X2");
        assert!(fx.store.pnr_exists(&booking.pnr).await.unwrap());
        assert_eq!(booking.user_id, session.user_id);
        assert_eq!(booking.departure_time, fx.flight.departure_time);
        assert_eq!(booking.destination_time, fx.flight.arrival_time);
        assert_eq!(booking.amount, fx.flight.price_amount);
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
        assert_eq!(booking.booking_status, BookingStatus::Confirmed);
        assert_eq!(fx.store.available_seats(fx.flight.id).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_fully_booked_flight_never_reaches_store() {
        let fx = fixture(0).await;
        let generator = Arc::new(ScriptedGenerator::new(&[]));
        let store = Arc::new(ScriptedStore::new(fx.store.clone()));
        let wf = workflow(fx.store.clone(), store.clone(), generator.clone(), WorkflowLimits::default());

        let result = wf.confirm_booking(&passenger(), &fx.flight).await;

        assert!(matches!(result, Err(BookingError::FlightFullyBooked { ref flight_code }) if flight_code == "GA101"));
        assert_eq!(store.creates(), 0);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_regenerates_until_code_is_unused() {
        let fx = fixture(10).await;
        let generator = Arc::new(ScriptedGenerator::new(&["GAAAA1", "GAAAA2", "GAAAA3", "GAAAA4"]));
        let mut store = ScriptedStore::new(fx.store.clone());
        store.taken = vec!["GAAAA1".into(), "GAAAA2".into(), "GAAAA3".into()];
        let store = Arc::new(store);
        let wf = workflow(fx.store.clone(), store.clone(), generator.clone(), WorkflowLimits::default());

        let booking = wf.confirm_booking(&passenger(), &fx.flight).await.unwrap();

        assert_eq!(generator.calls(), 4);
        assert_eq!(booking.pnr, "GAAAA4");
        assert_eq!(store.creates(), 1);
    }

    #[tokio::test]
    async fn test_code_search_gives_up_after_attempt_cap() {
        let fx = fixture(10).await;
        let generator = Arc::new(ScriptedGenerator::new(&["GAAAA1", "GAAAA1", "GAAAA1"]));
        let mut store = ScriptedStore::new(fx.store.clone());
        store.taken = vec!["GAAAA1".into()];
        let store = Arc::new(store);
        let limits = WorkflowLimits { pnr_max_attempts: 3, ..WorkflowLimits::default() };
        let wf = workflow(fx.store.clone(), store.clone(), generator.clone(), limits);

        let result = wf.confirm_booking(&passenger(), &fx.flight).await;

        assert!(matches!(result, Err(BookingError::ReservationCodeExhausted { attempts: 3 })));
        assert_eq!(generator.calls(), 3);
        assert_eq!(store.creates(), 0);
        assert_eq!(fx.store.booking_count().await, 0);
    }

    #[tokio::test]
    async fn test_code_search_times_out() {
        let fx = fixture(10).await;
        let generator = Arc::new(ScriptedGenerator::new(&[]));
        let mut store = ScriptedStore::new(fx.store.clone());
        store.taken = vec!["GAZZZZ".into()];
        store.lookup_delay = Some(std::time::Duration::from_millis(20));
        let store = Arc::new(store);
        let limits = WorkflowLimits {
            pnr_max_attempts: 1_000,
            pnr_timeout: std::time::Duration::from_millis(100),
        };
        let wf = workflow(fx.store.clone(), store.clone(), generator.clone(), limits);

        let result = wf.confirm_booking(&passenger(), &fx.flight).await;

        match result {
            Err(BookingError::ReservationCodeExhausted { attempts }) => assert!(attempts < 1_000),
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert_eq!(store.creates(), 0);
    }

    #[tokio::test]
    async fn test_store_rejection_leaves_no_booking() {
        let fx = fixture(10).await;
        let generator = Arc::new(ScriptedGenerator::new(&["GAQ7X2"]));
        let mut store = ScriptedStore::new(fx.store.clone());
        store.reject_creates = true;
        let store = Arc::new(store);
        let wf = workflow(fx.store.clone(), store.clone(), generator, WorkflowLimits::default());

        let result = wf.confirm_booking(&passenger(), &fx.flight).await;

        assert!(matches!(result, Err(BookingError::BookingPersistFailed(_))));
        assert_eq!(store.creates(), 1);
        assert_eq!(fx.store.booking_count().await, 0);
        assert!(!fx.store.pnr_exists("GAQ7X2").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_airline_code_is_rejected() {
        let mut fx = fixture(10).await;
        let generator = Arc::new(ScriptedGenerator::new(&[]));
        let wf = workflow(fx.store.clone(), fx.store.clone(), generator.clone(), WorkflowLimits::default());

        for code in ["  ", "-", ""] {
            fx.flight.airline_code = code.to_string();
            let result = wf.confirm_booking(&passenger(), &fx.flight).await;
            assert!(matches!(result, Err(BookingError::ValidationFailed(_))), "airline code {:?}", code);
        }
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_flight_is_a_validation_failure() {
        let fx = fixture(10).await;
        let mut stray = fx.flight.clone();
        stray.id = Uuid::new_v4();
        let wf = workflow(
            fx.store.clone(),
            fx.store.clone(),
            Arc::new(RandomPnrGenerator::new()),
            WorkflowLimits::default(),
        );

        let result = wf.confirm_booking(&passenger(), &stray).await;
        assert!(matches!(result, Err(BookingError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn test_last_seat_goes_to_first_confirmation() {
        let fx = fixture(1).await;
        let wf = workflow(
            fx.store.clone(),
            fx.store.clone(),
            Arc::new(RandomPnrGenerator::new()),
            WorkflowLimits::default(),
        );

        let first = wf.confirm_booking(&passenger(), &fx.flight).await;
        assert!(first.is_ok());
        assert_eq!(fx.store.available_seats(fx.flight.id).await.unwrap(), 0);

        let second = wf.confirm_booking(&passenger(), &fx.flight).await;
        assert!(matches!(second, Err(BookingError::FlightFullyBooked { .. })));
        assert_eq!(fx.store.booking_count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_confirmations_for_last_seat() {
        let fx = fixture(1).await;
        let wf = Arc::new(workflow(
            fx.store.clone(),
            fx.store.clone(),
            Arc::new(RandomPnrGenerator::new()),
            WorkflowLimits::default(),
        ));

        let (a, b) = {
            let (wf_a, wf_b) = (wf.clone(), wf.clone());
            let (flight_a, flight_b) = (fx.flight.clone(), fx.flight.clone());
            tokio::join!(
                tokio::spawn(async move { wf_a.confirm_booking(&passenger(), &flight_a).await }),
                tokio::spawn(async move { wf_b.confirm_booking(&passenger(), &flight_b).await }),
            )
        };
        let outcomes = [a.unwrap(), b.unwrap()];

        let booked = outcomes.iter().filter(|r| r.is_ok()).count();
        let full = outcomes
            .iter()
            .filter(|r| matches!(r, Err(BookingError::FlightFullyBooked { .. })))
            .count();

        assert_eq!(booked, 1);
        assert_eq!(full, 1);
        assert_eq!(fx.store.booking_count().await, 1);
    }
}
