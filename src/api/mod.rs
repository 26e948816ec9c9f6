//! API module for the employee directory HTTP server

pub mod routes;
pub mod server;

pub use routes::{ApiError, AppState};
pub use server::{router, ApiServer, EMPLOYEE_API_PREFIX};
