//! Application configuration loaded from environment variables.

use std::time::Duration;

use secrecy::SecretString;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEV_JWT_SECRET: &str = "development-only-secret-change-me";

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `8000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATABASE_URL` — PostgreSQL URL; the in-memory store is used when unset
/// - `JWT_SECRET` — token signing secret (development default when unset)
/// - `STORE_TIMEOUT_SECS` — per store operation deadline (default: `5`)
/// - `CORS_ORIGIN` — allowed browser origin (default: `"http://localhost:3000"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<SecretString>,
    pub jwt_secret: SecretString,
    pub store_timeout: Duration,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.is_empty())
                .map(SecretString::from),
            jwt_secret: std::env::var("JWT_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .map(SecretString::from)
                .unwrap_or(defaults.jwt_secret),
            store_timeout: std::env::var("STORE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.store_timeout),
            cors_origin: std::env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            database_url: None,
            jwt_secret: SecretString::from(DEV_JWT_SECRET),
            store_timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
        }
    }
}
