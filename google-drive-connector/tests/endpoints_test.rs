mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use google_drive_connector::api::{DriveFile, SharedDrive};
use google_drive_connector::config::SyncSettings;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_descriptor_and_config() {
    let app = app(FakeDriveApi::new());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let descriptor: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(descriptor["id"], "google-drive-connector");
    assert_eq!(descriptor["version"], "1.0.0");

    let (status, config) = post(&app, "/api/v1/synchronizer/config", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let types: Vec<&str> = config["types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(types, ["drive", "folder", "file", "user", "permission", "role"]);
    assert_eq!(config["filters"][0]["id"], "driveIds");
}

#[tokio::test]
async fn test_schema_for_requested_types() {
    let app = app(FakeDriveApi::new());
    let (status, body) = post(
        &app,
        "/api/v1/synchronizer/schema",
        json!({"types": ["file", "permission"], "account": account()}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["file"]["id"]["type"], "id");
    assert_eq!(body["file"]["driveId"]["relation"]["targetType"], "drive");
    assert!(body["permission"]["roleId"].is_object());
    assert!(body.get("drive").is_none());
}

#[tokio::test]
async fn test_validate_names_account() {
    let api = FakeDriveApi::new();
    api.set_current_user(user("me", "Ann Example"));
    let app = app(api);

    let (status, body) = post(&app, "/validate", json!({"fields": account()})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ann Example");
}

#[tokio::test]
async fn test_validate_rejected_token() {
    let api = FakeDriveApi::new();
    *api.user_error.lock().unwrap() = Some((401, "Invalid Credentials".to_string()));
    let app = app(api);

    let (status, body) = post(&app, "/validate", json!({"fields": account()})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid Credentials");
}

#[tokio::test]
async fn test_datalist_lists_all_drive_pages() {
    let api = FakeDriveApi::new();
    let drive = |id: &str| SharedDrive {
        id: id.to_string(),
        name: format!("Drive {}", id),
        ..Default::default()
    };
    api.push_drives(vec![drive("d1")], Some("more"));
    api.push_drives(vec![drive("d2")], None);
    let app = app(api);

    let (status, body) = post(
        &app,
        "/api/v1/synchronizer/datalist",
        json!({"account": account(), "field": "driveIds"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let values: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["value"].as_str().unwrap())
        .collect();
    assert_eq!(values, ["root", "shared_with_me", "d1", "d2"]);
    assert_eq!(body["items"][2]["title"], "Drive d1");
}

#[tokio::test]
async fn test_datalist_unknown_field() {
    let app = app(FakeDriveApi::new());
    let (status, body) = post(
        &app,
        "/api/v1/synchronizer/datalist",
        json!({"account": account(), "field": "owners"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown datalist field: owners");
}

#[tokio::test]
async fn test_resource_streams_file() {
    let api = FakeDriveApi::new();
    api.metadata.lock().unwrap().insert(
        "f1".to_string(),
        DriveFile {
            id: "f1".to_string(),
            name: "notes.txt".to_string(),
            mime_type: "text/plain".to_string(),
            size: Some("11".to_string()),
            ..Default::default()
        },
    );
    api.contents
        .lock()
        .unwrap()
        .insert("f1".to_string(), b"hello drive".to_vec());
    let app = app(api);

    let body = json!({"account": account(), "params": {"fileId": "f1"}});
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/synchronizer/resource")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(headers[header::CONTENT_LENGTH], "11");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"notes.txt\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"hello drive");
}

#[tokio::test]
async fn test_resource_requires_file_id() {
    let app = app(FakeDriveApi::new());
    let (status, body) = post(
        &app,
        "/api/v1/synchronizer/resource",
        json!({"account": account(), "params": {}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "\"fileId\" is missing");
}

#[tokio::test]
async fn test_resource_rejects_non_string_file_id() {
    let app = app(FakeDriveApi::new());
    let (status, body) = post(
        &app,
        "/api/v1/synchronizer/resource",
        json!({"account": account(), "params": {"fileId": 5}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid params"));
    assert_eq!(body["tryLater"], false);
}

#[tokio::test]
async fn test_authorize_builds_consent_url() {
    let app = app(FakeDriveApi::new());
    let (status, body) = post(
        &app,
        "/oauth2/v1/authorize",
        json!({"callback_uri": "https://app.example.com/cb", "state": "xyz"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let url = body["redirect_uri"].as_str().unwrap();
    assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(url.contains("client_id=client-id"));
    assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb"));
    assert!(url.contains("state=xyz"));
    assert!(url.contains("access_type=offline"));
}

#[tokio::test]
async fn test_authorize_requires_state() {
    let app = app(FakeDriveApi::new());
    let (status, body) = post(
        &app,
        "/oauth2/v1/authorize",
        json!({"callback_uri": "https://app.example.com/cb"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "state is required");
}

#[tokio::test]
async fn test_access_token_exchange() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/token")
        .match_body(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("code".into(), "auth-code".into()),
            mockito::Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            mockito::Matcher::UrlEncoded(
                "redirect_uri".into(),
                "https://app.example.com/cb".into(),
            ),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"at","refresh_token":"rt","expires_in":3600}"#)
        .create_async()
        .await;

    let app = app_with(
        FakeDriveApi::new(),
        SyncSettings::default(),
        &format!("{}/token", server.url()),
    );
    let (status, body) = post(
        &app,
        "/oauth2/v1/access_token",
        json!({"code": "auth-code", "fields": {"callback_uri": "https://app.example.com/cb"}}),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token"], "at");
    assert_eq!(body["refresh_token"], "rt");
    assert!(body["expire_on"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_access_token_requires_code() {
    let app = app(FakeDriveApi::new());
    let (status, body) = post(&app, "/oauth2/v1/access_token", json!({"fields": {}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Authorization code is required");
}

#[tokio::test]
async fn test_share_file_with_each_email() {
    let api = FakeDriveApi::new();
    let app = app(api.clone());

    let (status, body) = post(
        &app,
        "/api/v1/automations/action/execute",
        json!({
            "account": account(),
            "action": {
                "action": "share-file",
                "args": {
                    "resourceId": "f1",
                    "emails": "ann@example.com, bob@example.com",
                    "role": "Commenter",
                    "sendNotification": "false"
                }
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
    let created = api.created_permissions.lock().unwrap().clone();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].0, "f1");
    assert_eq!(created[0].1.role, "commenter");
    assert_eq!(created[0].1.email_address, "ann@example.com");
    assert_eq!(created[1].1.email_address, "bob@example.com");
    assert!(!created[0].2);
}

#[tokio::test]
async fn test_share_rejects_unknown_role() {
    let api = FakeDriveApi::new();
    let app = app(api.clone());

    let (status, body) = post(
        &app,
        "/api/v1/automations/action/execute",
        json!({
            "account": account(),
            "action": {
                "action": "share-file",
                "args": {"resourceId": "f1", "emails": "ann@example.com", "role": "Owner"}
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid role \"Owner\""));
    assert!(api.created_permissions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_action() {
    let app = app(FakeDriveApi::new());
    let (status, body) = post(
        &app,
        "/api/v1/automations/action/execute",
        json!({"account": account(), "action": {"action": "delete-everything", "args": {}}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown action: delete-everything");
}
