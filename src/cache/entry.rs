//! Cache entry management with TTL support

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached value stamped with its write time and expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// The cached value
    pub value: V,

    /// When the value was last written
    pub written_at: DateTime<Utc>,

    /// When the entry becomes logically absent
    pub expires_at: DateTime<Utc>,

    /// Number of hits served from this entry
    pub access_count: u64,
}

impl<V> CacheEntry<V> {
    /// Create a new entry expiring `ttl` after now
    pub fn new(value: V, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            value,
            written_at: now,
            expires_at: now + chrono_ttl(ttl),
            access_count: 0,
        }
    }

    /// Check if the entry has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check expiry against a given instant, so sweeps use one clock reading
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Mark the entry as accessed
    pub fn mark_accessed(&mut self) {
        self.access_count += 1;
    }

    /// Replace the value and restart the expiry window
    pub fn refresh(&mut self, value: V, ttl: Duration) {
        let now = Utc::now();
        self.value = value;
        self.written_at = now;
        self.expires_at = now + chrono_ttl(ttl);
    }
}

fn chrono_ttl(ttl: Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::seconds(300))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_cache_entry_creation() {
        let entry = CacheEntry::new("value".to_string(), Duration::from_secs(300));

        assert_eq!(entry.value, "value");
        assert!(!entry.is_expired());
        assert_eq!(entry.access_count, 0);
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(1u32, Duration::from_millis(100));

        assert!(!entry.is_expired());
        sleep(Duration::from_millis(150));
        assert!(entry.is_expired());
        assert!(entry.is_expired_at(entry.expires_at));
        assert!(!entry.is_expired_at(entry.written_at));
    }

    #[test]
    fn test_refresh_restarts_window() {
        let mut entry = CacheEntry::new("old".to_string(), Duration::from_millis(50));
        sleep(Duration::from_millis(60));
        assert!(entry.is_expired());

        entry.refresh("new".to_string(), Duration::from_secs(300));
        assert!(!entry.is_expired());
        assert_eq!(entry.value, "new");
    }

    #[test]
    fn test_mark_accessed() {
        let mut entry = CacheEntry::new((), Duration::from_secs(300));
        entry.mark_accessed();
        entry.mark_accessed();
        assert_eq!(entry.access_count, 2);
    }
}
