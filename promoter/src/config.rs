//! Configuration management for Flash Promoter.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Unset variables fall back to the default; set but malformed variables are
//! an error.

use crate::venue::DEFAULT_OVERFLOW_ALLOWANCE;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but does not parse
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        /// Environment variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// What a valid value looks like
        expected: &'static str,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoterConfig {
    /// Occupancy headroom above capacity (`FLASH_OVERFLOW_ALLOWANCE`, default 20)
    pub overflow_allowance: u32,
    /// Countdown period in milliseconds (`FLASH_COUNTDOWN_TICK_MS`, default 1000)
    pub countdown_tick_ms: u64,
    /// Lifetime of a claimed promo ticket (`FLASH_PROMO_CLAIM_MINUTES`, default 30)
    pub promo_claim_minutes: u32,
    /// Log level: trace, debug, info, warn, error (`FLASH_LOG_LEVEL`, default info)
    pub log_level: String,
}

impl Default for PromoterConfig {
    fn default() -> Self {
        Self {
            overflow_allowance: DEFAULT_OVERFLOW_ALLOWANCE,
            countdown_tick_ms: 1_000,
            promo_claim_minutes: 30,
            log_level: "info".to_string(),
        }
    }
}

impl PromoterConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to a value that
    /// does not parse or is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// See [`PromoterConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let overflow_allowance = parse_or(
            &lookup,
            "FLASH_OVERFLOW_ALLOWANCE",
            defaults.overflow_allowance,
            "a non-negative integer",
        )?;
        let countdown_tick_ms = parse_or(
            &lookup,
            "FLASH_COUNTDOWN_TICK_MS",
            defaults.countdown_tick_ms,
            "a positive number of milliseconds",
        )?;
        let promo_claim_minutes = parse_or(
            &lookup,
            "FLASH_PROMO_CLAIM_MINUTES",
            defaults.promo_claim_minutes,
            "a positive number of minutes",
        )?;
        let log_level = lookup("FLASH_LOG_LEVEL").unwrap_or(defaults.log_level);

        if countdown_tick_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "FLASH_COUNTDOWN_TICK_MS",
                value: countdown_tick_ms.to_string(),
                expected: "a positive number of milliseconds",
            });
        }
        if promo_claim_minutes == 0 {
            return Err(ConfigError::Invalid {
                key: "FLASH_PROMO_CLAIM_MINUTES",
                value: promo_claim_minutes.to_string(),
                expected: "a positive number of minutes",
            });
        }

        Ok(Self {
            overflow_allowance,
            countdown_tick_ms,
            promo_claim_minutes,
            log_level,
        })
    }

    /// Countdown period as a [`Duration`]
    #[must_use]
    pub const fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms)
    }

    /// Default `tracing` filter directive for this configuration
    #[must_use]
    pub fn log_filter(&self) -> String {
        format!(
            "flash_promoter={level},flash_promoter_runtime={level}",
            level = self.log_level
        )
    }
}

fn parse_or<F, T>(
    lookup: &F,
    key: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value,
            expected,
        }),
    }
}
