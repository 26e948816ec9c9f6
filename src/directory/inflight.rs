//! Shared in-flight loads for de-duplicating concurrent cache misses
//!
//! The first caller to miss a (cache, key) slot becomes its leader and runs
//! the load. Callers arriving while the load runs follow it and receive the
//! leader's outcome, success or error, without going upstream themselves.
//! The slot is released as soon as the leader finishes.

use crate::cache::{CacheKey, CacheName};
use crate::error::Result;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

type Slot = (CacheName, CacheKey);
type Outcome<T> = Option<Result<T>>;

/// Loads currently running, one per (cache, key) slot
#[derive(Debug)]
pub struct InFlight<T> {
    slots: Mutex<HashMap<Slot, watch::Receiver<Outcome<T>>>>,
}

impl<T> Default for InFlight<T> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

/// Role taken by a caller joining a slot
pub enum Flight<'a, T> {
    Leader(FlightLeader<'a, T>),
    Follower(FlightFollower<T>),
}

impl<T: Clone> InFlight<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lead the load for a slot, or follow the one already running
    pub fn join(&self, cache: CacheName, key: &str) -> Flight<'_, T> {
        let slot = (cache, key.to_string());
        let mut slots = self.slots();

        if let Some(receiver) = slots.get(&slot) {
            return Flight::Follower(FlightFollower {
                receiver: receiver.clone(),
            });
        }

        let (sender, receiver) = watch::channel(None);
        slots.insert(slot.clone(), receiver);

        Flight::Leader(FlightLeader {
            flights: self,
            slot,
            sender,
        })
    }

    /// Number of loads currently running
    pub fn active(&self) -> usize {
        self.slots().len()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<Slot, watch::Receiver<Outcome<T>>>> {
        // The map stays consistent even if a holder panicked
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The caller running the load for a slot
///
/// Dropping it without `complete` releases the slot and wakes followers
/// empty-handed, so one of them can take over.
pub struct FlightLeader<'a, T> {
    flights: &'a InFlight<T>,
    slot: Slot,
    sender: watch::Sender<Outcome<T>>,
}

impl<T> FlightLeader<'_, T> {
    /// Hand the outcome to every follower and release the slot
    pub fn complete(self, outcome: &Result<T>)
    where
        T: Clone,
    {
        // Fails only when nobody follows
        let _ = self.sender.send(Some(outcome.clone()));
    }
}

impl<T> Drop for FlightLeader<'_, T> {
    fn drop(&mut self) {
        let mut slots = self
            .flights
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        slots.remove(&self.slot);
    }
}

/// A caller waiting on another caller's load
pub struct FlightFollower<T> {
    receiver: watch::Receiver<Outcome<T>>,
}

impl<T: Clone> FlightFollower<T> {
    /// The leader's outcome, or `None` if the leader gave up
    pub async fn outcome(mut self) -> Option<Result<T>> {
        match self.receiver.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DirectoryError;
    use std::sync::Arc;
    use std::time::Duration;

    fn lead<'a>(flights: &'a InFlight<u32>, key: &str) -> FlightLeader<'a, u32> {
        match flights.join(CacheName::Employees, key) {
            Flight::Leader(leader) => leader,
            Flight::Follower(_) => panic!("expected to lead {}", key),
        }
    }

    fn follow(flights: &InFlight<u32>, key: &str) -> FlightFollower<u32> {
        match flights.join(CacheName::Employees, key) {
            Flight::Follower(follower) => follower,
            Flight::Leader(_) => panic!("expected to follow {}", key),
        }
    }

    #[tokio::test]
    async fn test_slot_released_after_completion() {
        let flights = InFlight::new();
        let leader = lead(&flights, "all");
        assert_eq!(flights.active(), 1);

        leader.complete(&Ok(1));
        assert_eq!(flights.active(), 0);
    }

    #[tokio::test]
    async fn test_distinct_slots_lead_independently() {
        let flights = InFlight::new();
        let _al = lead(&flights, "al");
        let _oh = lead(&flights, "oh");
        match flights.join(CacheName::EmployeeById, "al") {
            Flight::Leader(_) => {}
            Flight::Follower(_) => panic!("slots are per cache"),
        }
        assert_eq!(flights.active(), 2);
    }

    #[tokio::test]
    async fn test_followers_share_error() {
        let flights = Arc::new(InFlight::<u32>::new());
        let leader = lead(&flights, "all");

        let followers: Vec<_> = (0..5)
            .map(|_| tokio::spawn(follow(&flights, "all").outcome()))
            .collect();

        tokio::time::sleep(Duration::from_millis(5)).await;
        leader.complete(&Err(DirectoryError::UpstreamUnavailable("down".into())));

        for follower in followers {
            let outcome = follower.await.unwrap();
            assert_eq!(
                outcome,
                Some(Err(DirectoryError::UpstreamUnavailable("down".into())))
            );
        }
        assert_eq!(flights.active(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_lead_wakes_followers_empty() {
        let flights = InFlight::<u32>::new();
        let leader = lead(&flights, "all");
        let follower = follow(&flights, "all");

        drop(leader);

        assert_eq!(follower.outcome().await, None);
        let _next = lead(&flights, "all");
    }
}
