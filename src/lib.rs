//! # Employee Directory (employee-directory)
//!
//! A read-heavy caching layer in front of a third-party employee directory API.
//!
//! ## Features
//!
//! - Cache-aside reads with a fixed expiry window per named cache
//! - Selective invalidation: deleting an employee evicts only the cached
//!   searches that included them, tracked by a reverse index
//! - Optional de-duplication of concurrent upstream fetches for the same key
//! - Explicit upstream error propagation, with an opt-in fail-open mode
//! - An axum HTTP surface mirroring the upstream operations
//!
//! ## Example
//!
//! ```no_run
//! use employee_directory::{CacheConfig, DirectoryService, HttpEmployeeClient};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = HttpEmployeeClient::new(
//!         "http://localhost:8112/api/v1/employee",
//!         Duration::from_secs(10),
//!     )?;
//!
//!     let service = DirectoryService::new(Arc::new(client), CacheConfig::default());
//!
//!     let matches = service.get_employees_by_name_search("oe").await?;
//!     println!("{} employees match", matches.len());
//!
//!     let top = service.get_top_ten_highest_earning_employee_names().await?;
//!     println!("Top earners: {:?}", top);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod directory;
pub mod error;
pub mod model;

// Re-export main types for convenience
pub use cache::{
    CacheConfig, CacheConfigBuilder, CacheName, CacheStats, CacheStore, CachedValue, ReverseIndex,
    TtlCacheStore,
};
pub use client::{EmployeeClient, FailureMode, HttpEmployeeClient, InMemoryEmployeeClient};
pub use config::AppConfig;
pub use directory::DirectoryService;
pub use error::{DirectoryError, Result};
pub use model::{CreateEmployeeInput, Employee, EmployeeId};
