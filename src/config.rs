//! Configuration management for Bibliotheca server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Shared HS256 secret of the authentication layer that mints bearer tokens
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoansConfig {
    /// Loan duration used when a request does not provide one
    pub default_duration_days: i64,
    pub max_duration_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub loans: LoansConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables, e.g. BIBLIOTHECA_SERVER__PORT=9000
            .add_source(
                Environment::with_prefix("BIBLIOTHECA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for LoansConfig {
    fn default() -> Self {
        Self {
            default_duration_days: 14,
            max_duration_days: 365,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_defaults() {
        let loans = LoansConfig::default();
        assert_eq!(loans.default_duration_days, 14);
        assert!(loans.max_duration_days >= loans.default_duration_days);
    }

    #[test]
    fn test_deserialize_without_loans_section() {
        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")
            .unwrap()
            .set_default("server.port", 9000_i64)
            .unwrap()
            .set_default("database.url", "postgres://localhost/test")
            .unwrap()
            .set_default("database.max_connections", 5_i64)
            .unwrap()
            .set_default("database.min_connections", 1_i64)
            .unwrap()
            .set_default("auth.jwt_secret", "secret")
            .unwrap()
            .set_default("logging.level", "debug")
            .unwrap()
            .set_default("logging.format", "json")
            .unwrap()
            .build()
            .unwrap();

        let app: AppConfig = config.try_deserialize().unwrap();
        assert_eq!(app.server.port, 9000);
        assert_eq!(app.logging.format, "json");
        assert_eq!(app.loans.default_duration_days, 14);
    }
}
