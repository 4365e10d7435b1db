#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chargebee_connector::{create_app, ChargebeeConnector};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};
use std::sync::Arc;
use sync_connector::{ConcurrencyLimiter, ServerConfig};
use tower::ServiceExt;

pub const PAGE_SIZE: u32 = 2;

/// Connector whose every site resolves to the mock server.
pub fn app(server: &ServerGuard) -> Router {
    let connector = ChargebeeConnector::new(
        reqwest::Client::new(),
        ConcurrencyLimiter::new(4),
        PAGE_SIZE,
        2,
    )
    .with_base_url(server.url());
    create_app(Arc::new(connector), &ServerConfig::default())
}

pub fn account() -> Value {
    json!({ "site": "acme", "apiKey": "test_key" })
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// `/data` request body.
pub fn data_request(requested_type: &str) -> Value {
    json!({
        "account": account(),
        "requestedType": requested_type,
        "version": "2",
    })
}

pub async fn fetch(app: &Router, body: Value) -> (StatusCode, Value) {
    post(app, "/api/v1/synchronizer/data", body).await
}

/// `{"list": [{"<key>": item}, ..], "next_offset": ..}`
pub fn list_body(key: &str, items: Vec<Value>, next_offset: Option<&str>) -> String {
    let list: Vec<Value> = items.into_iter().map(|item| json!({ key: item })).collect();
    let mut body = json!({ "list": list });
    if let Some(offset) = next_offset {
        body["next_offset"] = json!(offset);
    }
    body.to_string()
}

/// Mock `GET /{resource}` with the given query matcher and list reply.
pub async fn mock_list(
    server: &mut ServerGuard,
    resource: &str,
    query: Matcher,
    body: String,
) -> Mock {
    server
        .mock("GET", format!("/{}", resource).as_str())
        .match_query(query)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

pub fn param(key: &str, value: &str) -> Matcher {
    Matcher::UrlEncoded(key.to_string(), value.to_string())
}

pub fn ids(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}
