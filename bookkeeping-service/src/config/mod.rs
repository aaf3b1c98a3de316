use serde::Deserialize;
use service_core::config::{self as core_config, get_env, get_env_parsed, is_production};
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct BookkeepingConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl BookkeepingConfig {
    pub fn load() -> Result<Self, AppError> {
        // Common config handles .env and the APP__ prefix
        let common = core_config::Config::load()?;
        let is_prod = is_production();

        let database = DatabaseConfig {
            url: get_env("DATABASE_URL", None, is_prod)?,
            // Pool sizing falls back to defaults in every environment
            max_connections: get_env_parsed("DATABASE_MAX_CONNECTIONS", 10, false)?,
            min_connections: get_env_parsed("DATABASE_MIN_CONNECTIONS", 1, false)?,
        };
        if database.min_connections > database.max_connections {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "DATABASE_MIN_CONNECTIONS ({}) exceeds DATABASE_MAX_CONNECTIONS ({})",
                database.min_connections,
                database.max_connections
            )));
        }

        Ok(BookkeepingConfig {
            common,
            service_name: get_env("SERVICE_NAME", Some("bookkeeping-service"), false)?,
            log_level: get_env("LOG_LEVEL", Some("info"), false)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
            database,
        })
    }
}
