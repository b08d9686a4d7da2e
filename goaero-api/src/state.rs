use std::sync::Arc;
use goaero_booking::{BookingWorkflow, RandomPnrGenerator, SearchService, WorkflowLimits};
use goaero_core::repository::{AirportDirectory, BookingStore, FlightDirectory};
use goaero_store::app_config::RateLimitConfig;
use goaero_store::RedisClient;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    pub workflow: Arc<BookingWorkflow>,
    pub flights: Arc<dyn FlightDirectory>,
    pub bookings: Arc<dyn BookingStore>,
    pub redis: Option<Arc<RedisClient>>,
    pub rate_limit: RateLimitConfig,
    pub auth: AuthConfig,
}

impl AppState {
    /// Wire the services over a set of storage backends.
    pub fn new(
        airports: Arc<dyn AirportDirectory>,
        flights: Arc<dyn FlightDirectory>,
        bookings: Arc<dyn BookingStore>,
        limits: WorkflowLimits,
        auth: AuthConfig,
    ) -> Self {
        let search = SearchService::new(airports, flights.clone());
        let workflow = BookingWorkflow::new(
            flights.clone(),
            bookings.clone(),
            Arc::new(RandomPnrGenerator::new()),
            limits,
        );

        Self {
            search: Arc::new(search),
            workflow: Arc::new(workflow),
            flights,
            bookings,
            redis: None,
            rate_limit: RateLimitConfig::default(),
            auth,
        }
    }

    pub fn with_rate_limiter(mut self, redis: Arc<RedisClient>, rate_limit: RateLimitConfig) -> Self {
        self.redis = Some(redis);
        self.rate_limit = rate_limit;
        self
    }
}
