//! Integration tests for the reqwest transport against a mock server

use std::sync::Arc;
use std::time::Duration;

use clinicflow_core::{
    CredentialStore, HttpMethod, Transport, TransportErrorCode, TransportRequest,
};
use clinicflow_infra::{FileCredentialStore, HttpTransport, MemoryCredentialStore};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(server: &MockServer, store: Arc<dyn CredentialStore>) -> HttpTransport {
    HttpTransport::builder()
        .base_url(format!("{}/api", server.uri()))
        .credential_store(store)
        .build()
        .expect("transport should build")
}

#[tokio::test]
async fn attaches_bearer_token_and_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/patients"))
        .and(header("authorization", "Bearer token-123"))
        .and(body_json(json!({ "first_name": "Ada" })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "success": true, "data": { "id": "p1" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport =
        transport_for(&server, Arc::new(MemoryCredentialStore::with_token("token-123")));
    let response = transport
        .execute(TransportRequest::post("/patients", json!({ "first_name": "Ada" })))
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.body["data"]["id"], "p1");
}

#[tokio::test]
async fn sends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/appointments"))
        .and(query_param("status", "scheduled"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server, Arc::new(MemoryCredentialStore::default()));
    let request = TransportRequest::get("/appointments")
        .with_query("status", "scheduled")
        .with_query("page", "2");

    assert!(transport.execute(request).await.is_ok());
}

#[tokio::test]
async fn non_success_status_carries_parsed_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/patients/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "success": false, "message": "Patient not found" })),
        )
        .mount(&server)
        .await;

    let transport = transport_for(&server, Arc::new(MemoryCredentialStore::default()));
    let err = transport.execute(TransportRequest::get("/patients/missing")).await.unwrap_err();

    assert_eq!(err.status, Some(404));
    assert_eq!(err.method, HttpMethod::Get);
    assert!(err.url.ends_with("/api/patients/missing"));
    assert_eq!(err.message, "HTTP 404: Patient not found");
    assert_eq!(err.payload.unwrap()["message"], "Patient not found");
}

#[tokio::test]
async fn no_content_becomes_null_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/patients/p1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let transport = transport_for(&server, Arc::new(MemoryCredentialStore::default()));
    let response = transport.execute(TransportRequest::delete("/patients/p1")).await.unwrap();

    assert_eq!(response.status, 204);
    assert!(response.body.is_null());
}

#[tokio::test]
async fn per_request_timeout_maps_to_timeout_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let transport = transport_for(&server, Arc::new(MemoryCredentialStore::default()));
    let err = transport
        .execute(TransportRequest::get("/health").with_timeout(Duration::from_millis(50)))
        .await
        .unwrap_err();

    assert_eq!(err.code, Some(TransportErrorCode::Timeout));
    assert_eq!(err.status, None);
}

#[tokio::test]
async fn token_changes_persist_through_file_store() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("credentials.json");
    let server = MockServer::start().await;

    let transport = transport_for(&server, Arc::new(FileCredentialStore::new(&store_path)));
    assert!(!transport.has_auth_token());

    transport.set_auth_token("persisted").unwrap();
    let reopened = transport_for(&server, Arc::new(FileCredentialStore::new(&store_path)));
    assert!(reopened.has_auth_token());

    reopened.clear_auth_token().unwrap();
    assert!(!store_path.exists());
}
