//! Named-cache store with time-based expiry

use crate::cache::{
    config::CacheConfig,
    entry::CacheEntry,
    invalidation::{InvalidationEvent, InvalidationReason},
    types::{CacheKey, CacheName, CacheStats},
};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Key/value store partitioned into named caches
///
/// Implementations must be internally synchronized: every operation may be
/// called concurrently from any task.
#[async_trait]
pub trait CacheStore<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Look up a live entry; expired entries read as absent
    async fn get(&self, cache: CacheName, key: &str) -> Result<Option<V>>;

    /// Write an entry, restarting its expiry window
    async fn put(&self, cache: CacheName, key: CacheKey, value: V) -> Result<()>;

    /// Remove one entry, returning whether it was present
    async fn evict(&self, cache: CacheName, key: &str) -> Result<bool>;

    /// Remove every entry of a named cache, returning how many were dropped
    async fn evict_all(&self, cache: CacheName) -> Result<usize>;
}

/// In-memory store with per-entry TTL
///
/// This implementation provides:
/// - Thread-safe async access via RwLock
/// - Expiry measured from the last write
/// - Lazy reclamation on read plus an optional background sweep
/// - Hit/miss metrics
pub struct TtlCacheStore<V> {
    /// Cache configuration
    pub(crate) config: CacheConfig,

    /// Internal storage
    state: Arc<RwLock<StoreState<V>>>,
}

/// Internal cache storage
struct StoreState<V> {
    /// Named caches, created lazily with the configured capacity hint
    caches: HashMap<CacheName, HashMap<CacheKey, CacheEntry<V>>>,

    /// Current cache statistics
    stats: CacheStats,
}

impl<V> StoreState<V> {
    fn entry_count(&self) -> usize {
        self.caches.values().map(HashMap::len).sum()
    }
}

impl<V> TtlCacheStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new store with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        info!("Initializing cache store with config: {:?}", config);

        let state = StoreState {
            caches: HashMap::with_capacity(CacheName::ALL.len()),
            stats: CacheStats::default(),
        };

        Self {
            config,
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Check whether a live entry exists, without touching metrics
    pub async fn contains(&self, cache: CacheName, key: &str) -> bool {
        let state = self.state.read().await;
        state
            .caches
            .get(&cache)
            .and_then(|entries| entries.get(key))
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Number of entries physically stored in a named cache
    pub async fn len(&self, cache: CacheName) -> usize {
        let state = self.state.read().await;
        state.caches.get(&cache).map_or(0, HashMap::len)
    }

    /// Check whether the whole store is empty
    pub async fn is_empty(&self) -> bool {
        let state = self.state.read().await;
        state.entry_count() == 0
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.read().await;
        let mut stats = state.stats.clone();
        stats.entries = state.entry_count();
        stats
    }

    /// Remove all expired entries, one event per affected cache
    pub async fn cleanup_expired(&self) -> Result<Vec<InvalidationEvent>> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut events = Vec::new();

        for &cache in &CacheName::ALL {
            let Some(entries) = state.caches.get_mut(&cache) else {
                continue;
            };

            let expired: Vec<CacheKey> = entries
                .iter()
                .filter(|(_, entry)| entry.is_expired_at(now))
                .map(|(key, _)| key.clone())
                .collect();

            if expired.is_empty() {
                continue;
            }

            for key in &expired {
                entries.remove(key);
            }

            debug!("Cleaned up {} expired entries from {}", expired.len(), cache);
            events.push(InvalidationEvent::new(cache, InvalidationReason::Expired, expired));
        }

        let swept: usize = events.iter().map(InvalidationEvent::len).sum();
        state.stats.evictions_ttl += swept as u64;

        Ok(events)
    }
}

#[async_trait]
impl<V> CacheStore<V> for TtlCacheStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, cache: CacheName, key: &str) -> Result<Option<V>> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let metrics = self.config.enable_metrics;

        let entries = state.caches.get_mut(&cache);
        let expired = entries
            .as_ref()
            .and_then(|entries| entries.get(key))
            .map(CacheEntry::is_expired);

        match (entries, expired) {
            (Some(entries), Some(true)) => {
                entries.remove(key);
                if metrics {
                    state.stats.misses += 1;
                }
                state.stats.evictions_ttl += 1;
                debug!("Cache entry expired: {}[{}]", cache, key);
                Ok(None)
            }
            (Some(entries), Some(false)) => {
                let value = entries.get_mut(key).map(|entry| {
                    entry.mark_accessed();
                    entry.value.clone()
                });
                if metrics {
                    state.stats.hits += 1;
                }
                debug!("Cache hit: {}[{}]", cache, key);
                Ok(value)
            }
            _ => {
                if metrics {
                    state.stats.misses += 1;
                }
                debug!("Cache miss: {}[{}]", cache, key);
                Ok(None)
            }
        }
    }

    async fn put(&self, cache: CacheName, key: CacheKey, value: V) -> Result<()> {
        let ttl = self.config.ttl_with_jitter();
        let capacity = self.config.initial_capacity;
        let mut state = self.state.write().await;

        let entries = state
            .caches
            .entry(cache)
            .or_insert_with(|| HashMap::with_capacity(capacity));

        if let Some(existing) = entries.get_mut(&key) {
            debug!("Updating existing cache entry: {}[{}]", cache, key);
            existing.refresh(value, ttl);
        } else {
            debug!("Inserting new cache entry: {}[{}]", cache, key);
            entries.insert(key, CacheEntry::new(value, ttl));
        }

        Ok(())
    }

    async fn evict(&self, cache: CacheName, key: &str) -> Result<bool> {
        let mut state = self.state.write().await;

        let removed = state
            .caches
            .get_mut(&cache)
            .and_then(|entries| entries.remove(key))
            .is_some();

        if removed {
            state.stats.invalidations += 1;
            debug!("Evicted cache entry: {}[{}]", cache, key);
        }

        Ok(removed)
    }

    async fn evict_all(&self, cache: CacheName) -> Result<usize> {
        let mut state = self.state.write().await;

        let count = match state.caches.get_mut(&cache) {
            Some(entries) => {
                let count = entries.len();
                entries.clear();
                count
            }
            None => 0,
        };

        state.stats.invalidations += count as u64;
        debug!("Cleared {} entries from {}", count, cache);

        Ok(count)
    }
}

/// Background task for automatic cache cleanup
pub async fn start_auto_cleanup<V>(store: Arc<TtlCacheStore<V>>)
where
    V: Clone + Send + Sync + 'static,
{
    let interval = store.config.cleanup_interval;

    info!("Starting automatic cache cleanup task (interval: {:?})", interval);

    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        match store.cleanup_expired().await {
            Ok(events) => {
                if !events.is_empty() {
                    debug!("Auto cleanup: {} events; {}", events.len(), store.stats().await);
                }
            }
            Err(e) => {
                warn!("Auto cleanup failed: {}", e);
            }
        }
    }
}
