//! API routes for the employee directory server

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::directory::DirectoryService;
use crate::error::DirectoryError;
use crate::model::{CreateEmployeeInput, Employee};

/// Application state
pub struct AppState {
    pub directory: Arc<DirectoryService>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error body returned by every failing route except a declined delete
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Directory error mapped onto an HTTP status
#[derive(Debug)]
pub struct ApiError(DirectoryError);

impl ApiError {
    fn malformed_id(raw: &str) -> Self {
        Self(DirectoryError::InvalidInput(format!(
            "'{}' is not a valid employee id",
            raw
        )))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DirectoryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DirectoryError::NotFound(_) => StatusCode::NOT_FOUND,
            DirectoryError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DirectoryError::UpstreamRejected { .. } | DirectoryError::SerializationError(_) => {
                StatusCode::BAD_GATEWAY
            }
            DirectoryError::ConfigError(_) | DirectoryError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self.0);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn employee_id(raw: &str) -> ApiResult<String> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| ApiError::malformed_id(raw))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_all_employees(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Employee>>> {
    Ok(Json(state.directory.get_all_employees().await?))
}

pub async fn search_by_name(
    State(state): State<Arc<AppState>>,
    Path(fragment): Path<String>,
) -> ApiResult<Json<Vec<Employee>>> {
    Ok(Json(
        state.directory.get_employees_by_name_search(&fragment).await?,
    ))
}

pub async fn get_employee_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Employee>> {
    let id = employee_id(&id)?;
    Ok(Json(state.directory.get_employee_by_id(&id).await?))
}

pub async fn highest_salary(State(state): State<Arc<AppState>>) -> ApiResult<Json<u64>> {
    Ok(Json(state.directory.get_highest_salary_of_employees().await?))
}

pub async fn top_ten_earner_names(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(
        state
            .directory
            .get_top_ten_highest_earning_employee_names()
            .await?,
    ))
}

/// Create endpoint; the payload is validated before going upstream
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreateEmployeeInput>,
) -> ApiResult<Response> {
    input.validate()?;

    let created = state.directory.create_employee(&input).await?;
    let location = format!("/{}", created.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    )
        .into_response())
}

pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = employee_id(&id)?;

    if state.directory.delete_employee_by_id(&id).await? {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    warn!("Delete of employee {} was not accepted upstream", id);
    Ok((
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Could not delete employee with id: {}", id),
    )
        .into_response())
}
