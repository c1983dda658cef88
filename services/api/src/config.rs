//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;
use wellness_plan_core::progress::{COMPLETION_DELAY, TICK_INTERVAL};

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Origin allowed to call the API from a browser.
    pub allowed_origin: String,
    /// Interval between two loading-screen progress ticks.
    pub loading_tick: Duration,
    /// Pause between 100% progress and showing the plan.
    pub loading_completion_delay: Duration,
    /// How long a session with no connection is kept before it is dropped.
    pub session_idle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: Level::INFO,
            allowed_origin: "http://localhost:3000".to_string(),
            loading_tick: TICK_INTERVAL,
            loading_completion_delay: COMPLETION_DELAY,
            session_idle_timeout: Duration::from_secs(30 * 60),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_address = match lookup("BIND_ADDRESS") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            None => defaults.bind_address,
        };

        let log_level = match lookup("RUST_LOG") {
            Some(raw) => raw.parse::<Level>().map_err(|_| {
                ConfigError::InvalidValue(
                    "RUST_LOG".to_string(),
                    format!("'{}' is not a valid log level", raw),
                )
            })?,
            None => defaults.log_level,
        };

        let allowed_origin = lookup("ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin);

        let loading_tick = millis(&lookup, "LOADING_TICK_MS")?.unwrap_or(defaults.loading_tick);
        if loading_tick.is_zero() {
            return Err(ConfigError::InvalidValue(
                "LOADING_TICK_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let loading_completion_delay = millis(&lookup, "LOADING_COMPLETION_DELAY_MS")?
            .unwrap_or(defaults.loading_completion_delay);

        let session_idle_timeout = match lookup("SESSION_IDLE_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                Ok(_) => {
                    return Err(ConfigError::InvalidValue(
                        "SESSION_IDLE_TIMEOUT_SECS".to_string(),
                        "must be greater than zero".to_string(),
                    ))
                }
                Err(e) => {
                    return Err(ConfigError::InvalidValue(
                        "SESSION_IDLE_TIMEOUT_SECS".to_string(),
                        e.to_string(),
                    ))
                }
            },
            None => defaults.session_idle_timeout,
        };

        Ok(Self {
            bind_address,
            log_level,
            allowed_origin,
            loading_tick,
            loading_completion_delay,
            session_idle_timeout,
        })
    }
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Duration>, ConfigError> {
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
        })
        .transpose()
}
