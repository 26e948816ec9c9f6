//! Records of entries leaving the cache
//!
//! Expired entries are reported by the background sweep. Writes report the
//! search results they evicted selectively and the caches they cleared.

use crate::cache::types::{CacheKey, CacheName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why entries left the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidationReason {
    /// Older than the expiry window
    Expired,

    /// Evicted key by key after a write
    Evicted,

    /// Dropped together with the rest of its named cache
    Cleared,
}

impl std::fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidationReason::Expired => write!(f, "expired"),
            InvalidationReason::Evicted => write!(f, "evicted"),
            InvalidationReason::Cleared => write!(f, "cleared"),
        }
    }
}

/// Keys removed from one named cache for one reason
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidationEvent {
    pub cache: CacheName,
    pub reason: InvalidationReason,
    pub timestamp: DateTime<Utc>,
    pub keys: Vec<CacheKey>,
}

impl InvalidationEvent {
    pub fn new(cache: CacheName, reason: InvalidationReason, keys: Vec<CacheKey>) -> Self {
        Self {
            cache,
            reason,
            timestamp: Utc::now(),
            keys,
        }
    }

    /// Number of keys removed
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
