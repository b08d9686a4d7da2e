use std::sync::Arc;
use std::net::SocketAddr;
use std::time::Duration;
use goaero_api::{app, AppState, AuthConfig};
use goaero_booking::WorkflowLimits;
use goaero_core::repository::{AirportDirectory, BookingStore, FlightDirectory};
use goaero_store::{DbClient, InMemoryStore, PostgresBookingStore, PostgresFlightRepository, RedisClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "goaero_api=debug,goaero_booking=debug,goaero_store=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = goaero_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting GoAero API on port {}", config.server.port);

    let (airports, flights, bookings): (Arc<dyn AirportDirectory>, Arc<dyn FlightDirectory>, Arc<dyn BookingStore>) =
        match &config.database {
            Some(db_config) => {
                let db = DbClient::new(db_config)
                    .await
                    .expect("Failed to connect to Postgres");
                db.migrate().await.expect("Failed to run migrations");

                let flight_repo = Arc::new(PostgresFlightRepository::new(db.pool.clone()));
                let airports: Arc<dyn AirportDirectory> = flight_repo.clone();
                let flights: Arc<dyn FlightDirectory> = flight_repo;
                let bookings: Arc<dyn BookingStore> = Arc::new(PostgresBookingStore::new(db.pool.clone()));
                (airports, flights, bookings)
            }
            None => {
                tracing::warn!("No [database] configured, using the in-memory store with demo data");
                let store = Arc::new(InMemoryStore::new());
                store.seed_demo().await;
                let airports: Arc<dyn AirportDirectory> = store.clone();
                let flights: Arc<dyn FlightDirectory> = store.clone();
                let bookings: Arc<dyn BookingStore> = store;
                (airports, flights, bookings)
            }
        };

    let limits = WorkflowLimits {
        pnr_max_attempts: config.booking.pnr_max_attempts,
        pnr_timeout: Duration::from_millis(config.booking.pnr_timeout_ms),
    };

    let auth = AuthConfig {
        secret: config.auth.jwt_secret.clone(),
        expiration: config.auth.jwt_expiration_seconds,
    };

    let mut app_state = AppState::new(airports, flights, bookings, limits, auth);

    if let Some(redis_config) = &config.redis {
        let redis_client = RedisClient::new(&redis_config.url).expect("Invalid Redis URL");
        app_state = app_state.with_rate_limiter(Arc::new(redis_client), config.rate_limit.clone());
    }

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("Failed to bind listener");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>()
    ).await.expect("Server error");
}
