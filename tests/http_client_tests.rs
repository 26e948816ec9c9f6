//! Upstream HTTP client against a mock employee API
//!
//! Test coverage:
//! - Envelope unwrapping for list, object and single-element list bodies
//! - Status mapping (404, 429, 5xx, other 4xx)
//! - Delete resolving the id to a name first
//! - Fail-open reporting for list and delete calls

use employee_directory::{
    CreateEmployeeInput, DirectoryError, EmployeeClient, FailureMode, HttpEmployeeClient,
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

const PREFIX: &str = "/api/v1/employee";

fn employee_json(id: Uuid, name: &str, salary: u64) -> serde_json::Value {
    json!({
        "id": id,
        "employee_name": name,
        "employee_salary": salary,
        "employee_age": 30,
        "employee_title": "Engineer",
        "employee_email": "someone@company.com"
    })
}

fn envelope(data: serde_json::Value) -> String {
    json!({ "data": data, "status": "Successfully processed request." }).to_string()
}

fn client_for(server: &ServerGuard, mode: FailureMode) -> HttpEmployeeClient {
    HttpEmployeeClient::new(format!("{}{}", server.url(), PREFIX), Duration::from_secs(2))
        .expect("Failed to create client")
        .with_failure_mode(mode)
}

#[tokio::test]
async fn test_fetch_all_unwraps_envelope() {
    let mut server = Server::new_async().await;
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mock = server
        .mock("GET", PREFIX)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(envelope(json!([
            employee_json(a, "Alice Smith", 1000),
            employee_json(b, "John Ohara", 2000)
        ])))
        .create_async()
        .await;

    let client = client_for(&server, FailureMode::Strict);
    let employees = client.fetch_all().await.unwrap();

    assert_eq!(employees.len(), 2);
    assert_eq!(employees[0].id, a);
    assert_eq!(employees[1].name, "John Ohara");
    assert_eq!(employees[1].salary, 2000);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_by_id_accepts_object_or_list() {
    let mut server = Server::new_async().await;
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    server
        .mock("GET", format!("{}/{}", PREFIX, a).as_str())
        .with_status(200)
        .with_body(envelope(employee_json(a, "Alice Smith", 1000)))
        .create_async()
        .await;
    server
        .mock("GET", format!("{}/{}", PREFIX, b).as_str())
        .with_status(200)
        .with_body(envelope(json!([employee_json(b, "John Ohara", 2000)])))
        .create_async()
        .await;

    let client = client_for(&server, FailureMode::Strict);
    assert_eq!(client.fetch_by_id(&a).await.unwrap().name, "Alice Smith");
    assert_eq!(client.fetch_by_id(&b).await.unwrap().name, "John Ohara");
}

#[tokio::test]
async fn test_status_mapping() {
    let mut server = Server::new_async().await;
    let (missing, throttled, broken, rejected) =
        (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    for (id, status) in [(missing, 404), (throttled, 429), (broken, 503), (rejected, 400)] {
        server
            .mock("GET", format!("{}/{}", PREFIX, id).as_str())
            .with_status(status)
            .with_body("nope")
            .create_async()
            .await;
    }

    let client = client_for(&server, FailureMode::Strict);

    assert!(matches!(
        client.fetch_by_id(&missing).await,
        Err(DirectoryError::NotFound(_))
    ));
    assert!(client.fetch_by_id(&throttled).await.unwrap_err().is_upstream_outage());
    assert!(client.fetch_by_id(&broken).await.unwrap_err().is_upstream_outage());
    assert_eq!(
        client.fetch_by_id(&rejected).await.unwrap_err(),
        DirectoryError::UpstreamRejected {
            status: 400,
            message: "nope".to_string()
        }
    );
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", PREFIX)
        .with_status(200)
        .with_body("{\"data\": 42}")
        .create_async()
        .await;

    let client = client_for(&server, FailureMode::Strict);
    assert!(matches!(
        client.fetch_all().await,
        Err(DirectoryError::SerializationError(_))
    ));
}

#[tokio::test]
async fn test_create_posts_input() {
    let mut server = Server::new_async().await;
    let id = Uuid::new_v4();
    let mock = server
        .mock("POST", PREFIX)
        .match_body(Matcher::Json(json!({
            "name": "Jane Doe",
            "salary": 90000,
            "age": 29,
            "title": "Engineer"
        })))
        .with_status(200)
        .with_body(envelope(employee_json(id, "Jane Doe", 90_000)))
        .create_async()
        .await;

    let client = client_for(&server, FailureMode::Strict);
    let input = CreateEmployeeInput::new("Jane Doe", 90_000, 29, "Engineer");
    let created = client.create(&input).await.unwrap();

    assert_eq!(created.id, id);
    assert_eq!(created.salary, 90_000);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_sends_name() {
    let mut server = Server::new_async().await;
    let id = Uuid::new_v4();

    server
        .mock("GET", format!("{}/{}", PREFIX, id).as_str())
        .with_status(200)
        .with_body(envelope(employee_json(id, "Jane Doe", 1000)))
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", PREFIX)
        .match_body(Matcher::Json(json!({ "name": "Jane Doe" })))
        .with_status(200)
        .with_body(envelope(json!(true)))
        .create_async()
        .await;

    let client = client_for(&server, FailureMode::Strict);
    assert!(client.delete(&id).await.unwrap());
    delete.assert_async().await;
}

#[tokio::test]
async fn test_delete_unknown_skips_delete_call() {
    let mut server = Server::new_async().await;
    let id = Uuid::new_v4();

    server
        .mock("GET", format!("{}/{}", PREFIX, id).as_str())
        .with_status(404)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", PREFIX)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server, FailureMode::Strict);
    assert!(matches!(
        client.delete(&id).await,
        Err(DirectoryError::NotFound(_))
    ));
    delete.assert_async().await;
}

#[tokio::test]
async fn test_fail_open_reports_empty_results() {
    let mut server = Server::new_async().await;
    let id = Uuid::new_v4();

    server
        .mock("GET", PREFIX)
        .with_status(500)
        .create_async()
        .await;
    server
        .mock("GET", format!("{}/{}", PREFIX, id).as_str())
        .with_status(500)
        .create_async()
        .await;

    let strict = client_for(&server, FailureMode::Strict);
    assert!(strict.fetch_all().await.unwrap_err().is_upstream_outage());
    assert!(strict.delete(&id).await.unwrap_err().is_upstream_outage());

    let open = client_for(&server, FailureMode::FailOpen);
    assert!(open.fetch_all().await.unwrap().is_empty());
    assert!(!open.delete(&id).await.unwrap());

    // Single-record reads never fabricate a record
    assert!(open.fetch_by_id(&id).await.unwrap_err().is_upstream_outage());
}

#[tokio::test]
async fn test_unreachable_upstream() {
    // Nothing listens on port 9 locally
    let client = HttpEmployeeClient::new("http://127.0.0.1:9/api/v1/employee", Duration::from_secs(1))
        .unwrap();
    assert!(client.fetch_all().await.unwrap_err().is_upstream_outage());
}
