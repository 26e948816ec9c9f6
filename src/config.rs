//! Process configuration loaded from the environment
//!
//! Values come from the process environment, which the binary extends with
//! `.env` through `dotenv` before anything else runs. Only
//! `EMPLOYEE_API_BASE_URL` is required.

use crate::cache::CacheConfig;
use crate::client::FailureMode;
use crate::error::{DirectoryError, Result};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_BASE_URL: &str = "EMPLOYEE_API_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "EMPLOYEE_API_TIMEOUT_SECS";
pub const ENV_FAILURE_MODE: &str = "EMPLOYEE_API_FAILURE_MODE";
pub const ENV_HOST: &str = "SERVER_HOST";
pub const ENV_PORT: &str = "SERVER_PORT";
pub const ENV_CACHE_TTL_SECS: &str = "CACHE_TTL_SECS";
pub const ENV_CACHE_INITIAL_CAPACITY: &str = "CACHE_INITIAL_CAPACITY";

/// Upstream API settings
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub failure_mode: FailureMode,
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8111,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Full application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub upstream: UpstreamConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Read the process environment, with `overrides` taking precedence
    pub fn from_env<I>(overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars: HashMap<String, String> = std::env::vars().collect();
        vars.extend(overrides);
        Self::from_vars(vars)
    }

    /// Build configuration from an explicit variable map
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let base_url = vars
            .get(ENV_BASE_URL)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| DirectoryError::ConfigError(format!("{} must be set", ENV_BASE_URL)))?;

        let timeout_secs: u64 = parse_or(&vars, ENV_TIMEOUT_SECS, 10)?;
        let failure_mode = match vars.get(ENV_FAILURE_MODE) {
            Some(raw) => raw.parse()?,
            None => FailureMode::default(),
        };

        let server_defaults = ServerConfig::default();
        let server = ServerConfig {
            host: vars.get(ENV_HOST).cloned().unwrap_or(server_defaults.host),
            port: parse_or(&vars, ENV_PORT, server_defaults.port)?,
        };

        let cache_defaults = CacheConfig::default();
        let ttl_secs: u64 = parse_or(&vars, ENV_CACHE_TTL_SECS, cache_defaults.default_ttl.as_secs())?;
        let cache = CacheConfig::builder()
            .default_ttl(Duration::from_secs(ttl_secs))
            .initial_capacity(parse_or(
                &vars,
                ENV_CACHE_INITIAL_CAPACITY,
                cache_defaults.initial_capacity,
            )?)
            .build();
        cache.validate().map_err(DirectoryError::ConfigError)?;

        Ok(Self {
            upstream: UpstreamConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
                failure_mode,
            },
            server,
            cache,
        })
    }
}

fn parse_or<T: FromStr>(vars: &HashMap<String, String>, name: &str, default: T) -> Result<T> {
    match vars.get(name) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            DirectoryError::ConfigError(format!("{} has invalid value '{}'", name, raw))
        }),
        None => Ok(default),
    }
}
