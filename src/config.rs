use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::ucloud::UcloudConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Reads `name`, falling back to `default` when unset or blank.
pub fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub fn env_parse<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        _ => Ok(default),
    }
}

#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl AuthSettings {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let ttl_minutes: u64 = env_parse("JWT_TTL_MINUTES", 30)?;

        Ok(Self {
            jwt_secret,
            token_ttl: Duration::from_secs(ttl_minutes * 60),
        })
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub auth: AuthSettings,
    pub ucloud: UcloudConfig,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let database_url = env_or("DATABASE_URL", "sqlite://educloud.db");
        let bind_addr = env_parse("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?;

        Ok(Self {
            database_url,
            bind_addr,
            auth: AuthSettings::new_from_env()?,
            ucloud: UcloudConfig::new_from_env()?,
        })
    }
}
