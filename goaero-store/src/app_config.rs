use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: Option<DatabaseConfig>,
    pub redis: Option<RedisConfig>,
    pub auth: AuthConfig,
    #[serde(default)]
    pub booking: BookingRules,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Knobs for the booking workflow.
#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    #[serde(default = "default_pnr_max_attempts")]
    pub pnr_max_attempts: u32,
    #[serde(default = "default_pnr_timeout_ms")]
    pub pnr_timeout_ms: u64,
}

fn default_pnr_max_attempts() -> u32 { 10 }
fn default_pnr_timeout_ms() -> u64 { 2000 }

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            pnr_max_attempts: default_pnr_max_attempts(),
            pnr_timeout_ms: default_pnr_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub requests_per_window: i64,
    pub window_seconds: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 100,
            window_seconds: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `GOAERO_SERVER__PORT=9000` sets `server.port`
            .add_source(config::Environment::with_prefix("GOAERO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                port = 8080

                [auth]
                jwt_secret = "dev-secret"
                jwt_expiration_seconds = 3600
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let cfg: Config = s.try_deserialize().unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.database.is_none());
        assert!(cfg.redis.is_none());
        assert_eq!(cfg.booking.pnr_max_attempts, 10);
        assert_eq!(cfg.booking.pnr_timeout_ms, 2000);
        assert_eq!(cfg.rate_limit.requests_per_window, 100);
    }

    #[test]
    fn test_booking_rules_override() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                port = 8080

                [database]
                url = "postgres://localhost/goaero"

                [auth]
                jwt_secret = "dev-secret"
                jwt_expiration_seconds = 3600

                [booking]
                pnr_max_attempts = 3
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let cfg: Config = s.try_deserialize().unwrap();
        assert_eq!(cfg.booking.pnr_max_attempts, 3);
        assert_eq!(cfg.booking.pnr_timeout_ms, 2000);
        assert_eq!(cfg.database.unwrap().max_connections, 5);
    }
}
