//! Employee record and creation payload

use crate::error::{DirectoryError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque unique employee identifier
pub type EmployeeId = Uuid;

/// Minimum accepted age for a new employee
pub const MIN_AGE: u32 = 16;

/// Maximum accepted age for a new employee
pub const MAX_AGE: u32 = 75;

/// Employee record as returned by the upstream directory
///
/// Non-id fields carry an `employee_` prefix on the wire, both upstream and
/// towards API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier
    pub id: EmployeeId,

    /// Display name, used for fragment search
    #[serde(rename = "employee_name")]
    pub name: String,

    /// Yearly salary
    #[serde(rename = "employee_salary")]
    pub salary: u64,

    #[serde(rename = "employee_age")]
    pub age: u32,

    #[serde(rename = "employee_title")]
    pub title: String,

    #[serde(rename = "employee_email", default)]
    pub email: String,
}

impl Employee {
    /// Case-insensitive substring match against the employee name
    ///
    /// `needle` must already be lowercased.
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }
}

/// Fields needed to create a new employee upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEmployeeInput {
    pub name: String,
    pub salary: u64,
    pub age: u32,
    pub title: String,
}

impl CreateEmployeeInput {
    /// Create a new creation payload
    pub fn new(name: impl Into<String>, salary: u64, age: u32, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            salary,
            age,
            title: title.into(),
        }
    }

    /// Validate field constraints before the payload reaches the service
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DirectoryError::InvalidInput("name must not be blank".to_string()));
        }

        if self.salary == 0 {
            return Err(DirectoryError::InvalidInput("salary must be positive".to_string()));
        }

        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(DirectoryError::InvalidInput(format!(
                "age must be between {} and {}",
                MIN_AGE, MAX_AGE
            )));
        }

        if self.title.trim().is_empty() {
            return Err(DirectoryError::InvalidInput("title must not be blank".to_string()));
        }

        Ok(())
    }
}

/// Parse an employee identifier
///
/// An identifier that is not a UUID cannot name any upstream record, so it
/// is reported as `NotFound`.
pub fn parse_employee_id(raw: &str) -> Result<EmployeeId> {
    Uuid::parse_str(raw.trim()).map_err(|_| DirectoryError::NotFound(raw.to_string()))
}
