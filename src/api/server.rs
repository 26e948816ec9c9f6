//! API server for the employee directory

use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::directory::DirectoryService;

use super::routes::{
    create_employee, delete_employee, get_all_employees, get_employee_by_id, health_check,
    highest_salary, search_by_name, top_ten_earner_names, AppState,
};

/// Mount point of the employee routes
pub const EMPLOYEE_API_PREFIX: &str = "/api/v1/employee";

/// Build the application router over a directory service
pub fn router(directory: Arc<DirectoryService>) -> Router {
    let app_state = Arc::new(AppState { directory });

    // Literal segments take precedence over the `:id` capture
    let employees = Router::new()
        .route("/", get(get_all_employees).post(create_employee))
        .route("/search/:fragment", get(search_by_name))
        .route("/highestSalary", get(highest_salary))
        .route("/topTenHighestEarningEmployeeNames", get(top_ten_earner_names))
        .route("/:id", get(get_employee_by_id).delete(delete_employee));

    Router::new()
        .route("/health", get(health_check))
        .nest(EMPLOYEE_API_PREFIX, employees)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// API server
pub struct ApiServer {
    config: ServerConfig,
    directory: Arc<DirectoryService>,
}

impl ApiServer {
    /// Create a new API server with configuration
    pub fn new(config: ServerConfig, directory: Arc<DirectoryService>) -> Self {
        Self { config, directory }
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        let app = router(self.directory);

        let addr = self.config.bind_address();
        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
