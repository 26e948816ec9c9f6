//! Reverse index from employees to the cached search fragments that include them
//!
//! The directory service records every fragment whose cached result contains
//! an employee. Deleting that employee then evicts exactly those fragments
//! from the search cache instead of clearing it.
//!
//! Entries for employees that were not deleted are not pruned when the search
//! cache is cleared wholesale. Such a lingering fragment only names a key
//! that is already gone, and evicting an absent key is a no-op.

use crate::model::EmployeeId;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

/// Employee identifier to search-fragment set mapping
#[derive(Debug, Default)]
pub struct ReverseIndex {
    fragments: RwLock<HashMap<EmployeeId, HashSet<String>>>,
}

impl ReverseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `fragment`'s cached result includes `employee`
    ///
    /// Idempotent. Concurrent calls for the same employee never lose a fragment.
    pub async fn track(&self, employee: EmployeeId, fragment: &str) {
        let mut fragments = self.fragments.write().await;
        fragments
            .entry(employee)
            .or_default()
            .insert(fragment.to_string());
    }

    /// Record one fragment for a whole result set under a single lock
    pub async fn track_all<I>(&self, employees: I, fragment: &str)
    where
        I: IntoIterator<Item = EmployeeId>,
    {
        let mut fragments = self.fragments.write().await;
        let mut tracked = 0usize;
        for employee in employees {
            if fragments
                .entry(employee)
                .or_default()
                .insert(fragment.to_string())
            {
                tracked += 1;
            }
        }
        debug!("Tracked fragment '{}' for {} new employees", fragment, tracked);
    }

    /// Fragments whose cached result includes `employee`; empty if untracked
    pub async fn fragments_for(&self, employee: &EmployeeId) -> HashSet<String> {
        let fragments = self.fragments.read().await;
        fragments.get(employee).cloned().unwrap_or_default()
    }

    /// Drop the employee's entry, returning the fragments it held
    ///
    /// Does not touch the search cache; evicting is the caller's job.
    pub async fn forget(&self, employee: &EmployeeId) -> HashSet<String> {
        let mut fragments = self.fragments.write().await;
        fragments.remove(employee).unwrap_or_default()
    }

    /// Number of employees with at least one tracked fragment
    pub async fn len(&self) -> usize {
        let fragments = self.fragments.read().await;
        fragments.values().filter(|set| !set.is_empty()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
