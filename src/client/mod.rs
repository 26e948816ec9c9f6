//! Upstream employee directory clients
//!
//! The directory service only depends on the [`EmployeeClient`] trait:
//! - [`HttpEmployeeClient`] talks to the real upstream API over HTTP
//! - [`InMemoryEmployeeClient`] keeps records in process, for local runs and tests

pub mod http;
pub mod memory;

use crate::error::{DirectoryError, Result};
use crate::model::{CreateEmployeeInput, Employee, EmployeeId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use http::HttpEmployeeClient;
pub use memory::{CallCounts, InMemoryEmployeeClient};

/// Contract of the upstream source of truth
///
/// Implementations never retry on their own; the caller decides.
#[async_trait]
pub trait EmployeeClient: Send + Sync {
    /// Fetch every employee
    async fn fetch_all(&self) -> Result<Vec<Employee>>;

    /// Fetch one employee, failing with `NotFound` if the id is unknown
    async fn fetch_by_id(&self, id: &EmployeeId) -> Result<Employee>;

    /// Create an employee and return the stored record
    async fn create(&self, input: &CreateEmployeeInput) -> Result<Employee>;

    /// Delete an employee; `Ok(false)` means the upstream declined
    async fn delete(&self, id: &EmployeeId) -> Result<bool>;
}

/// How upstream failures are reported to the directory service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureMode {
    /// Propagate every failure as an error
    #[default]
    Strict,
    /// Report failed list fetches as empty and failed deletes as `false`
    ///
    /// An outage then looks like an empty directory, and that empty list gets
    /// cached like any other result.
    FailOpen,
}

impl FailureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureMode::Strict => "strict",
            FailureMode::FailOpen => "fail-open",
        }
    }
}

impl FromStr for FailureMode {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(FailureMode::Strict),
            "fail-open" | "fail_open" | "failopen" => Ok(FailureMode::FailOpen),
            other => Err(DirectoryError::ConfigError(format!(
                "unknown failure mode '{}', expected 'strict' or 'fail-open'",
                other
            ))),
        }
    }
}
