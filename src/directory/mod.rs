//! Directory service: cached reads and invalidating writes over the upstream client

pub mod inflight;
pub mod service;

pub use inflight::{Flight, FlightFollower, FlightLeader, InFlight};
pub use service::{DirectoryService, NO_SALARY, TOP_EARNERS_LIMIT};
