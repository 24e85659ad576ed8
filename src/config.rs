//! Runtime configuration loaded from the environment (and `.env`)

use std::net::SocketAddr;
use std::time::Duration;

use chrono::FixedOffset;

use crate::booking::{AvailabilityPolicies, OccupancyPolicy};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
    /// Offset used to decide what "today" is for the hotel
    pub hotel_utc_offset: FixedOffset,
    pub policies: AvailabilityPolicies,
    pub cache_warm_interval: Duration,
    pub log_filter: String,
}

impl Config {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset and empty values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let offset_hours: i32 = parse(&get, "HOTEL_UTC_OFFSET_HOURS", 9)?;
        let hotel_utc_offset = FixedOffset::east_opt(offset_hours * 3600).ok_or_else(|| {
            ConfigError::Invalid {
                key: "HOTEL_UTC_OFFSET_HOURS",
                message: format!("{} is not a valid UTC offset", offset_hours),
            }
        })?;

        let policies = AvailabilityPolicies {
            query: parse(&get, "OCCUPYING_STATUSES_QUERY", OccupancyPolicy::guest_query())?,
            creation: parse(&get, "OCCUPYING_STATUSES_CREATION", OccupancyPolicy::creation())?,
        };

        Ok(Self {
            database_url,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&get, "PORT", 8080)?,
            database_max_connections: parse(&get, "DATABASE_MAX_CONNECTIONS", 10)?,
            hotel_utc_offset,
            policies,
            cache_warm_interval: Duration::from_secs(parse(&get, "CACHE_WARM_INTERVAL_SECS", 300)?),
            log_filter: get("RUST_LOG").unwrap_or_else(|| "hotel_reservations=info,tower_http=info".to_string()),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "HOST",
                message: e.to_string(),
            })
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::models::BookingStatus;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/hotel")])).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.hotel_utc_offset.local_minus_utc(), 9 * 3600);
        assert_eq!(config.policies, AvailabilityPolicies::default());
        assert_eq!(config.cache_warm_interval, Duration::from_secs(300));
        assert!(config.bind_addr().is_ok());
    }

    #[test]
    fn test_database_url_required() {
        let err = Config::from_lookup(lookup(&[("PORT", "3000")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/hotel"),
            ("PORT", "3000"),
            ("HOTEL_UTC_OFFSET_HOURS", "-5"),
            ("OCCUPYING_STATUSES_QUERY", "PENDING, CONFIRMED, COMPLETED"),
        ]))
        .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.hotel_utc_offset.local_minus_utc(), -5 * 3600);
        assert!(config.policies.query.occupies(BookingStatus::Pending));
        assert_eq!(config.policies.creation, OccupancyPolicy::creation());
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/hotel"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/hotel"),
            ("OCCUPYING_STATUSES_CREATION", "CANCELLED"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "OCCUPYING_STATUSES_CREATION", .. }));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/hotel"),
            ("HOTEL_UTC_OFFSET_HOURS", "30"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "HOTEL_UTC_OFFSET_HOURS", .. }));
    }
}
