#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use contacts_api::config::AppConfig;
use contacts_api::database::{ContactStore, MemoryContactStore};
use contacts_api::models::{Address, Contact, Name, Phone, PhoneType};
use contacts_api::secrets::{SecretsClient, SecretsError, TokenVerifier};
use contacts_api::state::AppState;

pub const VALID_TOKEN: &str = "reporting-ui-token";

/// Serves a fixed allow-list document without touching the network.
struct StaticSecretsClient;

#[async_trait]
impl SecretsClient for StaticSecretsClient {
    async fn fetch_raw(&self, _path: &str) -> Result<String, SecretsError> {
        Ok(format!(r#"{{"reporting-ui": "{}", "batch-loader": "loader-token"}}"#, VALID_TOKEN))
    }
}

/// In-process application over a memory store; the store handle is
/// returned so tests can seed and inspect it directly.
pub fn test_app() -> (Router, Arc<MemoryContactStore>) {
    let store = Arc::new(MemoryContactStore::new());
    let verifier = Arc::new(TokenVerifier::new(Arc::new(StaticSecretsClient), "contacts/test"));
    let state = AppState::new(Arc::new(AppConfig::default()), store.clone(), verifier);
    (contacts_api::app(state), store)
}

pub fn contact_fixture(first: &str, last: &str, email: &str) -> Contact {
    Contact {
        id: None,
        name: Name { first: first.into(), middle: None, last: last.into() },
        address: Address {
            street: Some("123 Main St".into()),
            city: Some("Springfield".into()),
            state: "VA".into(),
            zip: "22150".into(),
        },
        phone: vec![Phone { number: "703-555-0100".into(), r#type: Some(PhoneType::Mobile) }],
        email: email.into(),
    }
}

/// Loads the three-record fixture set; the store assigns ids 1..=3.
pub async fn seed_contacts(store: &MemoryContactStore) -> Vec<Contact> {
    let fixtures = [
        contact_fixture("Mike", "Mitchell", "m@e.gov"),
        contact_fixture("Jane", "Doe", "jane@e.gov"),
        contact_fixture("Sam", "Smith", "sam@e.gov"),
    ];

    let mut seeded = Vec::new();
    for fixture in fixtures {
        seeded.push(store.save(fixture).await.expect("seed contact"));
    }
    seeded
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", VALID_TOKEN)
        .body(Body::empty())
        .expect("request")
}

pub fn request_with_json(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", VALID_TOKEN)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn anonymous_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).expect("request")
}

/// Runs one request through the router and returns status plus raw body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.expect("infallible router");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes()
        .to_vec();
    (status, body)
}

pub fn as_json(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).expect("JSON body")
}
