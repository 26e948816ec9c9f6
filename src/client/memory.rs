//! In-process employee directory
//!
//! Behaves like the upstream API and counts every call, so cache behaviour
//! can be observed from the outside.

use crate::client::EmployeeClient;
use crate::error::{DirectoryError, Result};
use crate::model::{CreateEmployeeInput, Employee, EmployeeId};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Number of calls received per operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub fetch_all: usize,
    pub fetch_by_id: usize,
    pub create: usize,
    pub delete: usize,
}

/// Upstream stand-in holding records in memory
#[derive(Debug, Default)]
pub struct InMemoryEmployeeClient {
    employees: RwLock<Vec<Employee>>,
    fetch_all_calls: AtomicUsize,
    fetch_by_id_calls: AtomicUsize,
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    unavailable: AtomicBool,
    decline_deletes: AtomicBool,
    latency: RwLock<Option<Duration>>,
}

impl InMemoryEmployeeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory pre-populated with `employees`
    pub fn with_employees(employees: Vec<Employee>) -> Self {
        Self {
            employees: RwLock::new(employees),
            ..Default::default()
        }
    }

    /// Snapshot of the call counters
    pub fn calls(&self) -> CallCounts {
        CallCounts {
            fetch_all: self.fetch_all_calls.load(Ordering::SeqCst),
            fetch_by_id: self.fetch_by_id_calls.load(Ordering::SeqCst),
            create: self.create_calls.load(Ordering::SeqCst),
            delete: self.delete_calls.load(Ordering::SeqCst),
        }
    }

    /// Make every subsequent call fail with `UpstreamUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make deletes answer `false` without removing anything
    pub fn set_decline_deletes(&self, decline: bool) {
        self.decline_deletes.store(decline, Ordering::SeqCst);
    }

    /// Delay every call, to widen race windows in concurrency tests
    pub async fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().await = latency;
    }

    async fn simulate_round_trip(&self) -> Result<()> {
        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::UpstreamUnavailable(
                "in-memory directory marked unavailable".to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl EmployeeClient for InMemoryEmployeeClient {
    async fn fetch_all(&self) -> Result<Vec<Employee>> {
        self.fetch_all_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_round_trip().await?;
        Ok(self.employees.read().await.clone())
    }

    async fn fetch_by_id(&self, id: &EmployeeId) -> Result<Employee> {
        self.fetch_by_id_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_round_trip().await?;
        self.employees
            .read()
            .await
            .iter()
            .find(|employee| employee.id == *id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))
    }

    async fn create(&self, input: &CreateEmployeeInput) -> Result<Employee> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_round_trip().await?;

        let employee = Employee {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            salary: input.salary,
            age: input.age,
            title: input.title.clone(),
            email: format!(
                "{}@company.com",
                input.name.to_lowercase().split_whitespace().collect::<Vec<_>>().join(".")
            ),
        };

        self.employees.write().await.push(employee.clone());
        Ok(employee)
    }

    async fn delete(&self, id: &EmployeeId) -> Result<bool> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_round_trip().await?;

        if self.decline_deletes.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let mut employees = self.employees.write().await;
        let before = employees.len();
        employees.retain(|employee| employee.id != *id);
        if employees.len() == before {
            return Err(DirectoryError::NotFound(id.to_string()));
        }

        Ok(true)
    }
}
