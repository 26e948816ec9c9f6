//! HTTP client for the upstream employee API

use crate::client::{EmployeeClient, FailureMode};
use crate::error::{DirectoryError, Result};
use crate::model::{CreateEmployeeInput, Employee, EmployeeId};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Response envelope used by every upstream endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    status: Option<String>,
}

/// Single-record endpoints answer with either an object or a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Employee>),
    One(Employee),
}

impl OneOrMany {
    fn into_first(self) -> Option<Employee> {
        match self {
            OneOrMany::Many(list) => list.into_iter().next(),
            OneOrMany::One(employee) => Some(employee),
        }
    }
}

/// Upstream deletes by name, not by id
#[derive(Debug, Serialize)]
struct DeleteByName<'a> {
    name: &'a str,
}

/// Client for the upstream employee REST API
#[derive(Debug, Clone)]
pub struct HttpEmployeeClient {
    http: reqwest::Client,
    base_url: String,
    failure_mode: FailureMode,
}

impl HttpEmployeeClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(DirectoryError::ConfigError(
                "upstream base URL must not be blank".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DirectoryError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            failure_mode: FailureMode::Strict,
        })
    }

    /// Set how upstream failures are reported
    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn failure_mode(&self) -> FailureMode {
        self.failure_mode
    }

    fn by_id_url(&self, id: &EmployeeId) -> String {
        format!("{}/{}", self.base_url, id)
    }

    /// Map the status line and unwrap the `data` field of the envelope
    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> Result<T> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound(context.to_string()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(DirectoryError::UpstreamUnavailable(format!(
                "{} returned {}",
                context, status
            )));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DirectoryError::UpstreamRejected {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        if let Some(upstream_status) = envelope.status.as_deref() {
            debug!("{}: upstream status '{}'", context, upstream_status);
        }

        envelope.data.ok_or_else(|| {
            error!("{}: response body missing data", context);
            DirectoryError::SerializationError(format!("{}: response body missing data", context))
        })
    }

    async fn fetch_all_strict(&self) -> Result<Vec<Employee>> {
        let response = self.http.get(&self.base_url).send().await?;
        Self::read_envelope(response, "fetch all employees").await
    }

    async fn delete_strict(&self, id: &EmployeeId) -> Result<bool> {
        let employee = self.fetch_by_id(id).await?;

        let response = self
            .http
            .delete(&self.base_url)
            .json(&DeleteByName { name: &employee.name })
            .send()
            .await?;

        Self::read_envelope(response, &format!("delete employee {}", id)).await
    }
}

#[async_trait]
impl EmployeeClient for HttpEmployeeClient {
    async fn fetch_all(&self) -> Result<Vec<Employee>> {
        match self.fetch_all_strict().await {
            Ok(employees) => Ok(employees),
            Err(e) if self.failure_mode == FailureMode::FailOpen => {
                warn!("Fetching all employees failed, reporting empty list: {}", e);
                Ok(Vec::new())
            }
            Err(e) => {
                warn!("Fetching all employees failed: {}", e);
                Err(e)
            }
        }
    }

    async fn fetch_by_id(&self, id: &EmployeeId) -> Result<Employee> {
        let context = format!("employee {}", id);
        let response = self.http.get(self.by_id_url(id)).send().await?;
        let data: OneOrMany = Self::read_envelope(response, &context).await?;
        data.into_first().ok_or(DirectoryError::NotFound(context))
    }

    async fn create(&self, input: &CreateEmployeeInput) -> Result<Employee> {
        let response = self.http.post(&self.base_url).json(input).send().await?;
        let data: OneOrMany = Self::read_envelope(response, "create employee").await?;
        data.into_first().ok_or_else(|| {
            DirectoryError::SerializationError("create employee: empty data".to_string())
        })
    }

    async fn delete(&self, id: &EmployeeId) -> Result<bool> {
        match self.delete_strict(id).await {
            Ok(deleted) => Ok(deleted),
            Err(e) if self.failure_mode == FailureMode::FailOpen => {
                warn!("Deleting employee {} failed, reporting not deleted: {}", id, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_base_url_rejected() {
        let result = HttpEmployeeClient::new("  ", Duration::from_secs(1));
        assert!(matches!(result, Err(DirectoryError::ConfigError(_))));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client =
            HttpEmployeeClient::new("http://localhost:8112/api/v1/employee/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8112/api/v1/employee");
        assert_eq!(client.failure_mode(), FailureMode::Strict);
    }

    #[test]
    fn test_one_or_many_deserialization() {
        let one: OneOrMany = serde_json::from_value(serde_json::json!({
            "id": "67050f6d-c2a6-4a59-be61-a8479af074ba",
            "employee_name": "Alice Barnett",
            "employee_salary": 105000,
            "employee_age": 20,
            "employee_title": "Product Manager",
            "employee_email": "alice@example.com"
        }))
        .unwrap();
        assert_eq!(one.into_first().unwrap().name, "Alice Barnett");

        let many: OneOrMany = serde_json::from_value(serde_json::json!([])).unwrap();
        assert!(many.into_first().is_none());
    }
}
