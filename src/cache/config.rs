//! Configuration for the cache system

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the cache store and the directory service
///
/// Defaults mirror the upstream directory's expected freshness:
/// - Entries expire 5 minutes after their last write
/// - Each named cache starts with room for 100 entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live measured from the last write of an entry
    pub default_ttl: Duration,

    /// Initial capacity hint for each named cache
    /// Not a limit: writes past this size are always accepted
    pub initial_capacity: usize,

    /// TTL jitter factor (0.0 - 1.0)
    /// Spreads expiry of entries written together
    pub ttl_jitter: f64,

    /// Enable the background sweep of expired entries
    pub enable_auto_cleanup: bool,

    /// Interval for the background sweep
    pub cleanup_interval: Duration,

    /// Enable hit/miss counters
    pub enable_metrics: bool,

    /// De-duplicate concurrent misses on the same key so only one reaches upstream
    pub deduplicate_fetches: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(300),
            initial_capacity: 100,
            ttl_jitter: 0.0,
            enable_auto_cleanup: true,
            cleanup_interval: Duration::from_secs(60),
            enable_metrics: true,
            deduplicate_fetches: true,
        }
    }
}

impl CacheConfig {
    /// Start a builder with every field unset
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Check field ranges; the message names the offending field
    pub fn validate(&self) -> Result<(), String> {
        if self.default_ttl.is_zero() {
            return Err("default_ttl must be non-zero".to_string());
        }

        if self.ttl_jitter < 0.0 || self.ttl_jitter > 1.0 {
            return Err(format!("ttl_jitter {} is outside 0.0..=1.0", self.ttl_jitter));
        }

        if self.enable_auto_cleanup && self.cleanup_interval.is_zero() {
            return Err("cleanup_interval must be non-zero when auto cleanup is on".to_string());
        }

        Ok(())
    }

    /// TTL for one write, spread by up to `ttl_jitter` either side
    pub fn ttl_with_jitter(&self) -> Duration {
        if self.ttl_jitter == 0.0 {
            return self.default_ttl;
        }

        let ttl = self.default_ttl.as_secs_f64();
        let spread = ttl * self.ttl_jitter * (rand::random::<f64>() * 2.0 - 1.0);

        // Never hand out a zero TTL
        Duration::from_secs_f64((ttl + spread).max(0.001))
    }

    /// Configuration for tests and demos: short TTL, no background sweep
    pub fn short_lived(ttl: Duration) -> Self {
        Self {
            default_ttl: ttl,
            enable_auto_cleanup: false,
            ..Default::default()
        }
    }
}

/// Builder for [`CacheConfig`]; unset fields keep their defaults
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    default_ttl: Option<Duration>,
    initial_capacity: Option<usize>,
    ttl_jitter: Option<f64>,
    enable_auto_cleanup: Option<bool>,
    cleanup_interval: Option<Duration>,
    enable_metrics: Option<bool>,
    deduplicate_fetches: Option<bool>,
}

impl CacheConfigBuilder {
    /// Expiry window, measured from the last write
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Set the per-cache initial capacity hint
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    pub fn ttl_jitter(mut self, jitter: f64) -> Self {
        self.ttl_jitter = Some(jitter);
        self
    }

    /// Run the background sweep of expired entries
    pub fn enable_auto_cleanup(mut self, enable: bool) -> Self {
        self.enable_auto_cleanup = Some(enable);
        self
    }

    /// Period of the background sweep
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    /// Count hits and misses
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = Some(enable);
        self
    }

    /// Enable or disable per-key fetch de-duplication
    pub fn deduplicate_fetches(mut self, enable: bool) -> Self {
        self.deduplicate_fetches = Some(enable);
        self
    }

    /// Fill unset fields from `CacheConfig::default()`
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            default_ttl: self.default_ttl.unwrap_or(defaults.default_ttl),
            initial_capacity: self.initial_capacity.unwrap_or(defaults.initial_capacity),
            ttl_jitter: self.ttl_jitter.unwrap_or(defaults.ttl_jitter),
            enable_auto_cleanup: self
                .enable_auto_cleanup
                .unwrap_or(defaults.enable_auto_cleanup),
            cleanup_interval: self.cleanup_interval.unwrap_or(defaults.cleanup_interval),
            enable_metrics: self.enable_metrics.unwrap_or(defaults.enable_metrics),
            deduplicate_fetches: self
                .deduplicate_fetches
                .unwrap_or(defaults.deduplicate_fetches),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert_eq!(config.initial_capacity, 100);
        assert!(config.deduplicate_fetches);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut invalid_config = CacheConfig::default();
        invalid_config.default_ttl = Duration::ZERO;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = CacheConfig::default();
        invalid_config.ttl_jitter = 1.5;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = CacheConfig::default();
        invalid_config.cleanup_interval = Duration::ZERO;
        assert!(invalid_config.validate().is_err());

        invalid_config.enable_auto_cleanup = false;
        assert!(invalid_config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = CacheConfig::builder()
            .default_ttl(Duration::from_secs(600))
            .initial_capacity(500)
            .deduplicate_fetches(false)
            .build();

        assert_eq!(config.default_ttl, Duration::from_secs(600));
        assert_eq!(config.initial_capacity, 500);
        assert!(!config.deduplicate_fetches);
        assert!(config.enable_metrics);
    }

    #[test]
    fn test_ttl_without_jitter_is_exact() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl_with_jitter(), Duration::from_secs(300));
    }

    #[test]
    fn test_ttl_with_jitter() {
        let config = CacheConfig {
            default_ttl: Duration::from_secs(300),
            ttl_jitter: 0.1,
            ..Default::default()
        };

        let ttl = config.ttl_with_jitter();
        assert!(ttl.as_secs_f64() >= 270.0);
        assert!(ttl.as_secs_f64() <= 330.0);
    }

    #[test]
    fn test_short_lived_preset() {
        let config = CacheConfig::short_lived(Duration::from_millis(50));
        assert_eq!(config.default_ttl, Duration::from_millis(50));
        assert!(!config.enable_auto_cleanup);
    }
}
