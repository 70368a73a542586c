use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::clock::DEFAULT_CLOCK_FLUSH_EVERY;
use crate::console::ConsoleSettings;
use crate::event::DEFAULT_CHANNEL_CAPACITY;
use crate::possession::DEFAULT_POSSESSION_FLUSH_EVERY;
use crate::session::Role;

pub const BIND_ADDR_VAR: &str = "MATCHTAGGER_BIND_ADDR";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const ROLE_VAR: &str = "MATCHTAGGER_ROLE";
pub const TICK_MS_VAR: &str = "MATCHTAGGER_TICK_MS";
pub const CLOCK_FLUSH_EVERY_VAR: &str = "MATCHTAGGER_CLOCK_FLUSH_EVERY";
pub const POSSESSION_FLUSH_EVERY_VAR: &str = "MATCHTAGGER_POSSESSION_FLUSH_EVERY";
pub const CHANNEL_CAPACITY_VAR: &str = "MATCHTAGGER_CHANNEL_CAPACITY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string; the in-memory store is used without one
    pub database_url: Option<String>,
    /// Role of the consoles this server hosts
    pub role: Role,
    pub tick: Duration,
    pub clock_flush_every: u32,
    pub possession_flush_every: u32,
    pub channel_capacity: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: None,
            role: Role::Operator,
            tick: Duration::from_millis(1000),
            clock_flush_every: DEFAULT_CLOCK_FLUSH_EVERY,
            possession_flush_every: DEFAULT_POSSESSION_FLUSH_EVERY,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ConsoleConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from any variable source; unset variables keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let tick_ms = parse_var(&lookup, TICK_MS_VAR)?.unwrap_or(defaults.tick.as_millis() as u64);

        Ok(Self {
            bind_addr: parse_var(&lookup, BIND_ADDR_VAR)?.unwrap_or(defaults.bind_addr),
            database_url: lookup(DATABASE_URL_VAR).filter(|url| !url.trim().is_empty()),
            role: parse_var(&lookup, ROLE_VAR)?.unwrap_or(defaults.role),
            tick: Duration::from_millis(positive(TICK_MS_VAR, tick_ms)?),
            clock_flush_every: positive(
                CLOCK_FLUSH_EVERY_VAR,
                parse_var(&lookup, CLOCK_FLUSH_EVERY_VAR)?.unwrap_or(defaults.clock_flush_every),
            )?,
            possession_flush_every: positive(
                POSSESSION_FLUSH_EVERY_VAR,
                parse_var(&lookup, POSSESSION_FLUSH_EVERY_VAR)?
                    .unwrap_or(defaults.possession_flush_every),
            )?,
            channel_capacity: positive(
                CHANNEL_CAPACITY_VAR,
                parse_var(&lookup, CHANNEL_CAPACITY_VAR)?.unwrap_or(defaults.channel_capacity),
            )?,
        })
    }

    pub fn console_settings(&self) -> ConsoleSettings {
        ConsoleSettings {
            tick: self.tick,
            clock_flush_every: self.clock_flush_every,
            possession_flush_every: self.possession_flush_every,
        }
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };

    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: value.clone(),
            reason: e.to_string(),
        })
}

fn positive<T>(var: &'static str, value: T) -> Result<T, ConfigError>
where
    T: Default + PartialEq + std::fmt::Display,
{
    if value == T::default() {
        return Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
