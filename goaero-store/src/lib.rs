pub mod app_config;
pub mod database;
pub mod redis_repo;
pub mod flight_repo;
pub mod booking_repo;
pub mod memory;

pub use database::DbClient;
pub use redis_repo::RedisClient;
pub use flight_repo::PostgresFlightRepository;
pub use booking_repo::PostgresBookingStore;
pub use memory::InMemoryStore;
