//! Cache-aside directory service
//!
//! Reads check the named cache first and fall back to the upstream client on
//! a miss. Writes go upstream first and only touch the caches once the
//! upstream call succeeded.

use crate::cache::{
    CacheConfig, CacheName, CacheStore, CachedValue, InvalidationEvent, InvalidationReason,
    ReverseIndex, TtlCacheStore, SINGLETON_KEY,
};
use crate::client::EmployeeClient;
use crate::directory::inflight::{Flight, InFlight};
use crate::error::{DirectoryError, Result};
use crate::model::{parse_employee_id, CreateEmployeeInput, Employee, EmployeeId};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Number of names returned by the top earners query
pub const TOP_EARNERS_LIMIT: usize = 10;

/// Salary reported when the directory is empty
pub const NO_SALARY: u64 = 0;

/// Caches cleared wholesale by every create
const CLEARED_ON_CREATE: [CacheName; 4] = [
    CacheName::Employees,
    CacheName::TopSalary,
    CacheName::TopEarners,
    CacheName::EmployeesByNameSearch,
];

/// Caches cleared wholesale by every delete; search results are evicted selectively
const CLEARED_ON_DELETE: [CacheName; 3] = [
    CacheName::Employees,
    CacheName::TopSalary,
    CacheName::TopEarners,
];

/// Employee directory fronted by named caches and a reverse index
pub struct DirectoryService {
    client: Arc<dyn EmployeeClient>,
    cache: Arc<dyn CacheStore<CachedValue>>,
    index: ReverseIndex,
    in_flight: Option<InFlight<CachedValue>>,

    /// Bumped after every successful write's invalidation
    write_epoch: AtomicU64,

    /// Populations hold it shared, invalidations hold it exclusively
    write_gate: RwLock<()>,
}

impl DirectoryService {
    /// Create a service backed by a fresh in-memory TTL store
    pub fn new(client: Arc<dyn EmployeeClient>, config: CacheConfig) -> Self {
        let store: Arc<dyn CacheStore<CachedValue>> = Arc::new(TtlCacheStore::new(config.clone()));
        Self::with_store(client, store, &config)
    }

    /// Create a service over an existing store
    pub fn with_store(
        client: Arc<dyn EmployeeClient>,
        cache: Arc<dyn CacheStore<CachedValue>>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            client,
            cache,
            index: ReverseIndex::new(),
            in_flight: config.deduplicate_fetches.then(InFlight::new),
            write_epoch: AtomicU64::new(0),
            write_gate: RwLock::new(()),
        }
    }

    /// Create a service and pre-populate the all-employees cache
    pub async fn initialize(
        client: Arc<dyn EmployeeClient>,
        cache: Arc<dyn CacheStore<CachedValue>>,
        config: &CacheConfig,
    ) -> Self {
        let service = Self::with_store(client, cache, config);
        service.warm_up().await;
        service
    }

    /// Fetch all employees once; failure is logged and otherwise ignored
    ///
    /// Returns the number of employees cached, if the fetch succeeded.
    pub async fn warm_up(&self) -> Option<usize> {
        match self.get_all_employees().await {
            Ok(employees) => {
                info!("Warmed cache with [{}] entries", employees.len());
                Some(employees.len())
            }
            Err(e) => {
                warn!("Failed to warm cache: [{}]", e);
                None
            }
        }
    }

    /// Reverse index of search fragments, for inspection
    pub fn reverse_index(&self) -> &ReverseIndex {
        &self.index
    }

    /// Every employee known upstream
    pub async fn get_all_employees(&self) -> Result<Vec<Employee>> {
        self.cached(CacheName::Employees, SINGLETON_KEY, None, move || self.load_all())
            .await?
            .into_employees()
            .ok_or_else(|| mismatched(CacheName::Employees))
    }

    /// Employees whose name contains `fragment`, ignoring case
    pub async fn get_employees_by_name_search(&self, fragment: &str) -> Result<Vec<Employee>> {
        let key = fragment.to_lowercase();
        let needle = key.as_str();

        self.cached(CacheName::EmployeesByNameSearch, needle, Some(needle), move || {
            self.load_search(needle)
        })
        .await?
        .into_employees()
        .ok_or_else(|| mismatched(CacheName::EmployeesByNameSearch))
    }

    /// One employee by id; ids that are not UUIDs are `NotFound`
    pub async fn get_employee_by_id(&self, id: &str) -> Result<Employee> {
        let employee_id = parse_employee_id(id)?;
        let key = employee_id.to_string();

        self.cached(CacheName::EmployeeById, &key, None, move || self.load_one(employee_id))
            .await?
            .into_employee()
            .ok_or_else(|| mismatched(CacheName::EmployeeById))
    }

    /// Highest salary in the directory, or 0 when it is empty
    pub async fn get_highest_salary_of_employees(&self) -> Result<u64> {
        self.cached(CacheName::TopSalary, SINGLETON_KEY, None, move || self.load_top_salary())
            .await?
            .into_salary()
            .ok_or_else(|| mismatched(CacheName::TopSalary))
    }

    /// Names of the ten best paid employees, highest salary first
    ///
    /// Equal salaries keep their upstream order.
    pub async fn get_top_ten_highest_earning_employee_names(&self) -> Result<Vec<String>> {
        self.cached(CacheName::TopEarners, SINGLETON_KEY, None, move || self.load_top_earners())
            .await?
            .into_names()
            .ok_or_else(|| mismatched(CacheName::TopEarners))
    }

    /// Create an employee upstream, then cache it by id and clear list-derived caches
    pub async fn create_employee(&self, input: &CreateEmployeeInput) -> Result<Employee> {
        let created = self.client.create(input).await?;

        let _gate = self.write_gate.write().await;

        self.cache
            .put(
                CacheName::EmployeeById,
                created.id.to_string(),
                CachedValue::Employee(created.clone()),
            )
            .await?;

        self.clear_all(&CLEARED_ON_CREATE).await?;

        self.write_epoch.fetch_add(1, Ordering::SeqCst);
        info!("Created employee {}, cleared list caches", created.id);

        Ok(created)
    }

    /// Delete an employee upstream, then evict it and only the searches that included it
    ///
    /// `Ok(false)` means upstream declined and no cache was touched.
    pub async fn delete_employee_by_id(&self, id: &str) -> Result<bool> {
        let employee_id = parse_employee_id(id)?;

        if !self.client.delete(&employee_id).await? {
            warn!("Upstream declined to delete employee {}", employee_id);
            return Ok(false);
        }

        let _gate = self.write_gate.write().await;

        self.cache
            .evict(CacheName::EmployeeById, &employee_id.to_string())
            .await?;

        self.clear_all(&CLEARED_ON_DELETE).await?;

        let evicted = self.evict_searches_for(&employee_id).await?;

        self.write_epoch.fetch_add(1, Ordering::SeqCst);
        info!(
            "Deleted employee {}, evicted {} cached searches {:?}",
            employee_id,
            evicted.len(),
            evicted.keys
        );

        Ok(true)
    }

    async fn load_all(&self) -> Result<CachedValue> {
        Ok(CachedValue::Employees(self.client.fetch_all().await?))
    }

    async fn load_search(&self, needle: &str) -> Result<CachedValue> {
        let matched: Vec<Employee> = self
            .get_all_employees()
            .await?
            .into_iter()
            .filter(|employee| employee.name_contains(needle))
            .collect();
        debug!("Fragment '{}' matched {} employees", needle, matched.len());
        Ok(CachedValue::Employees(matched))
    }

    async fn load_one(&self, id: EmployeeId) -> Result<CachedValue> {
        Ok(CachedValue::Employee(self.client.fetch_by_id(&id).await?))
    }

    async fn load_top_salary(&self) -> Result<CachedValue> {
        let highest = self
            .get_all_employees()
            .await?
            .iter()
            .map(|employee| employee.salary)
            .max()
            .unwrap_or(NO_SALARY);
        Ok(CachedValue::Salary(highest))
    }

    async fn load_top_earners(&self) -> Result<CachedValue> {
        let mut employees = self.get_all_employees().await?;
        // Stable: equal salaries keep upstream order
        employees.sort_by(|a, b| b.salary.cmp(&a.salary));
        let names = employees
            .into_iter()
            .take(TOP_EARNERS_LIMIT)
            .map(|employee| employee.name)
            .collect();
        Ok(CachedValue::Names(names))
    }

    async fn clear_all(&self, caches: &[CacheName]) -> Result<()> {
        for &cache in caches {
            let count = self.cache.evict_all(cache).await?;
            debug!("{} {}: {} entries", InvalidationReason::Cleared, cache, count);
        }
        Ok(())
    }

    /// Evict every cached search that included `employee`, then forget it
    async fn evict_searches_for(&self, employee: &EmployeeId) -> Result<InvalidationEvent> {
        let fragments = self.index.fragments_for(employee).await;

        let mut evicted = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            // Absent when the search cache was cleared since tracking
            if self.cache.evict(CacheName::EmployeesByNameSearch, &fragment).await? {
                evicted.push(fragment);
            }
        }

        self.index.forget(employee).await;
        Ok(InvalidationEvent::new(
            CacheName::EmployeesByNameSearch,
            InvalidationReason::Evicted,
            evicted,
        ))
    }

    /// Get-or-populate for one cache slot
    ///
    /// Concurrent misses on the same slot share one load and its outcome.
    /// A value computed while a write invalidated the caches is returned but
    /// not stored. With `track_fragment`, the employees of a stored result are
    /// registered in the reverse index before the result becomes visible.
    async fn cached<F, Fut>(
        &self,
        cache: CacheName,
        key: &str,
        track_fragment: Option<&str>,
        load: F,
    ) -> Result<CachedValue>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<CachedValue>> + Send,
    {
        if let Some(value) = self.cache.get(cache, key).await? {
            return Ok(value);
        }

        let Some(flights) = &self.in_flight else {
            return self.populate(cache, key, track_fragment, load).await;
        };

        let leader = loop {
            match flights.join(cache, key) {
                Flight::Leader(leader) => break leader,
                Flight::Follower(follower) => {
                    if let Some(outcome) = follower.outcome().await {
                        debug!("Shared in-flight load of {}[{}]", cache, key);
                        return outcome;
                    }
                    // The leader was cancelled; take over
                }
            }
        };

        // A previous leader may have stored the value just before releasing
        let outcome = match self.cache.get(cache, key).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => self.populate(cache, key, track_fragment, load).await,
            Err(e) => Err(e),
        };

        leader.complete(&outcome);
        outcome
    }

    /// Load a slot's value and store it unless a write intervened
    async fn populate<F, Fut>(
        &self,
        cache: CacheName,
        key: &str,
        track_fragment: Option<&str>,
        load: F,
    ) -> Result<CachedValue>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<CachedValue>> + Send,
    {
        let epoch = self.write_epoch.load(Ordering::SeqCst);
        let value = load().await?;

        let _gate = self.write_gate.read().await;
        if self.write_epoch.load(Ordering::SeqCst) != epoch {
            debug!("Skipping population of {}[{}]: invalidated while loading", cache, key);
            return Ok(value);
        }

        if let (Some(fragment), CachedValue::Employees(matched)) = (track_fragment, &value) {
            self.index
                .track_all(matched.iter().map(|employee| employee.id), fragment)
                .await;
        }

        self.cache.put(cache, key.to_string(), value.clone()).await?;
        Ok(value)
    }
}

fn mismatched(cache: CacheName) -> DirectoryError {
    DirectoryError::Other(format!("{} cache held a value of the wrong kind", cache))
}
