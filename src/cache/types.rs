//! Names, keys and values of the directory caches

use crate::model::Employee;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key within a named cache
pub type CacheKey = String;

/// Key used by caches that hold a single value (all employees, top salary, top earners)
pub const SINGLETON_KEY: &str = "all";

/// Named caches maintained by the directory service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CacheName {
    /// All-employees list
    Employees,
    /// Search results keyed by lowercased fragment
    EmployeesByNameSearch,
    /// Single employee keyed by identifier
    EmployeeById,
    /// Highest salary scalar
    TopSalary,
    /// Ordered names of the top earners
    TopEarners,
}

impl CacheName {
    /// Every named cache, in declaration order
    pub const ALL: [CacheName; 5] = [
        CacheName::Employees,
        CacheName::EmployeesByNameSearch,
        CacheName::EmployeeById,
        CacheName::TopSalary,
        CacheName::TopEarners,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheName::Employees => "employees",
            CacheName::EmployeesByNameSearch => "employeesByNameSearch",
            CacheName::EmployeeById => "employeeById",
            CacheName::TopSalary => "topSalary",
            CacheName::TopEarners => "topEarners",
        }
    }
}

impl fmt::Display for CacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value held by the directory service's caches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CachedValue {
    Employees(Vec<Employee>),
    Employee(Employee),
    Salary(u64),
    Names(Vec<String>),
}

impl CachedValue {
    pub fn into_employees(self) -> Option<Vec<Employee>> {
        match self {
            CachedValue::Employees(list) => Some(list),
            _ => None,
        }
    }

    pub fn into_employee(self) -> Option<Employee> {
        match self {
            CachedValue::Employee(employee) => Some(employee),
            _ => None,
        }
    }

    pub fn into_salary(self) -> Option<u64> {
        match self {
            CachedValue::Salary(salary) => Some(salary),
            _ => None,
        }
    }

    pub fn into_names(self) -> Option<Vec<String>> {
        match self {
            CachedValue::Names(names) => Some(names),
            _ => None,
        }
    }
}

/// Counters kept by a store across all named caches
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,

    /// Expired entries count as misses
    pub misses: u64,

    /// Entries physically stored, expired ones included
    pub entries: usize,

    /// Entries dropped for being older than the expiry window
    pub evictions_ttl: u64,

    /// Entries dropped by `evict` or `evict_all`
    pub invalidations: u64,
}

impl CacheStats {
    /// Reads served so far, hit or miss
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Share of reads answered from cache, in `0.0..=1.0`
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            n => self.hits as f64 / n as f64,
        }
    }

    pub fn miss_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            n => self.misses as f64 / n as f64,
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hits / {} misses ({:.1}% hit), {} entries, {} expired, {} invalidated",
            self.hits,
            self.misses,
            self.hit_rate() * 100.0,
            self.entries,
            self.evictions_ttl,
            self.invalidations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_name_display() {
        assert_eq!(CacheName::Employees.to_string(), "employees");
        assert_eq!(CacheName::EmployeesByNameSearch.to_string(), "employeesByNameSearch");
        assert_eq!(CacheName::EmployeeById.to_string(), "employeeById");
        assert_eq!(CacheName::TopSalary.to_string(), "topSalary");
        assert_eq!(CacheName::TopEarners.to_string(), "topEarners");
    }

    #[test]
    fn test_cached_value_accessors() {
        assert_eq!(CachedValue::Salary(5).into_salary(), Some(5));
        assert_eq!(CachedValue::Salary(5).into_names(), None);
        assert_eq!(
            CachedValue::Names(vec!["a".into()]).into_names(),
            Some(vec!["a".to_string()])
        );
        assert!(CachedValue::Employees(Vec::new()).into_employee().is_none());
    }

    #[test]
    fn test_stats_rates() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };

        assert_eq!(stats.lookups(), 4);
        assert_eq!(stats.hit_rate(), 0.75);
        assert_eq!(stats.miss_rate(), 0.25);
    }

    #[test]
    fn test_stats_before_first_read() {
        let stats = CacheStats::default();
        assert_eq!(stats.lookups(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.miss_rate(), 0.0);
    }

    #[test]
    fn test_stats_summary_line() {
        let stats = CacheStats {
            hits: 9,
            misses: 1,
            entries: 4,
            evictions_ttl: 2,
            invalidations: 3,
        };

        assert_eq!(
            stats.to_string(),
            "9 hits / 1 misses (90.0% hit), 4 entries, 2 expired, 3 invalidated"
        );
    }
}
