//! # Directory Caching Layer
//!
//! This module implements the caches that sit between API consumers and the
//! upstream employee directory.
//!
//! ## Features
//!
//! - **TTL-Based Expiration**: every entry expires a fixed time after its last write
//! - **Named Caches**: one keyspace per query shape (all employees, search, by id, ...)
//! - **Lazy and Eager Reclamation**: expired entries are dropped on read and by a
//!   background sweep
//! - **Reverse Index**: employee to search-fragment tracking for selective invalidation
//!
//! ## Example
//!
//! ```rust
//! use employee_directory::cache::{CacheConfig, CacheName, CacheStore, TtlCacheStore};
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = CacheConfig::builder()
//!     .default_ttl(Duration::from_secs(300))
//!     .initial_capacity(100)
//!     .build();
//!
//! let cache: TtlCacheStore<String> = TtlCacheStore::new(config);
//!
//! cache.put(CacheName::EmployeeById, "id-1".to_string(), "cached".to_string()).await?;
//!
//! if let Some(value) = cache.get(CacheName::EmployeeById, "id-1").await? {
//!     println!("Cache hit: {}", value);
//! }
//!
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod invalidation;
pub mod reverse_index;
pub mod store;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use entry::CacheEntry;
pub use invalidation::{InvalidationEvent, InvalidationReason};
pub use reverse_index::ReverseIndex;
pub use store::{start_auto_cleanup, CacheStore, TtlCacheStore};
pub use types::{CacheKey, CacheName, CacheStats, CachedValue, SINGLETON_KEY};
