#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use futures::stream;
use google_drive_connector::api::{
    ByteStream, DriveApi, DriveFile, DriveList, DriveUser, FileList, ListFilesRequest,
    NewPermission, Permission, PermissionList, SharedDrive,
};
use google_drive_connector::config::{GoogleOAuthConfig, SyncSettings};
use google_drive_connector::{create_app, DriveAccount, DriveApiFactory, GoogleDriveConnector};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use sync_connector::{AppError, Result, ServerConfig};
use tower::ServiceExt;

/// Explicit id generator, one per test.
pub struct Sequence {
    prefix: &'static str,
    next: usize,
}

impl Sequence {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, next: 1 }
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

pub fn file(ids: &mut Sequence, mime_type: &str) -> DriveFile {
    let id = ids.next_id();
    DriveFile {
        name: format!("{}.bin", id),
        mime_type: mime_type.to_string(),
        owned_by_me: Some(true),
        created_time: Some("2024-01-01T00:00:00.000Z".to_string()),
        modified_time: Some("2024-02-01T00:00:00.000Z".to_string()),
        id,
        ..Default::default()
    }
}

pub fn sized(mut file: DriveFile, bytes: u64) -> DriveFile {
    file.size = Some(bytes.to_string());
    file
}

pub fn in_drive(mut file: DriveFile, drive_id: &str) -> DriveFile {
    file.drive_id = Some(drive_id.to_string());
    file
}

pub fn with_permissions(mut file: DriveFile, permissions: Vec<Permission>) -> DriveFile {
    file.permissions = Some(permissions);
    file
}

pub fn user(id: &str, name: &str) -> DriveUser {
    DriveUser {
        permission_id: Some(id.to_string()),
        display_name: Some(name.to_string()),
        email_address: Some(format!("{}@example.com", id)),
        photo_link: None,
    }
}

pub fn permission(ids: &mut Sequence, kind: &str, role: &str) -> Permission {
    Permission {
        id: ids.next_id(),
        kind: kind.to_string(),
        role: role.to_string(),
        ..Default::default()
    }
}

pub fn files_page(files: Vec<DriveFile>, next: Option<&str>) -> FileList {
    FileList {
        files,
        next_page_token: next.map(String::from),
    }
}

pub fn permissions_page(permissions: Vec<Permission>, next: Option<&str>) -> PermissionList {
    PermissionList {
        permissions,
        next_page_token: next.map(String::from),
    }
}

/// Scripted Drive API. Listings are served in the order they were queued;
/// every call is recorded.
#[derive(Default)]
pub struct FakeDriveApi {
    pub file_pages: Mutex<VecDeque<FileList>>,
    pub drive_pages: Mutex<VecDeque<DriveList>>,
    pub permission_pages: Mutex<HashMap<String, VecDeque<PermissionList>>>,
    pub exports: Mutex<HashMap<String, std::result::Result<String, (u16, String)>>>,
    pub metadata: Mutex<HashMap<String, DriveFile>>,
    pub contents: Mutex<HashMap<String, Vec<u8>>>,
    pub current_user: Mutex<Option<DriveUser>>,
    pub user_error: Mutex<Option<(u16, String)>>,

    pub list_requests: Mutex<Vec<ListFilesRequest>>,
    pub permission_requests: Mutex<Vec<(String, Option<String>)>>,
    pub export_requests: Mutex<Vec<(String, String)>>,
    pub created_permissions: Mutex<Vec<(String, NewPermission, bool)>>,
}

impl FakeDriveApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_files(&self, page: FileList) {
        self.file_pages.lock().unwrap().push_back(page);
    }

    pub fn push_drives(&self, drives: Vec<SharedDrive>, next: Option<&str>) {
        self.drive_pages.lock().unwrap().push_back(DriveList {
            drives,
            next_page_token: next.map(String::from),
        });
    }

    pub fn push_permissions(&self, resource_id: &str, page: PermissionList) {
        self.permission_pages
            .lock()
            .unwrap()
            .entry(resource_id.to_string())
            .or_default()
            .push_back(page);
    }

    pub fn set_export(&self, file_id: &str, result: std::result::Result<&str, (u16, &str)>) {
        self.exports.lock().unwrap().insert(
            file_id.to_string(),
            result.map(String::from).map_err(|(s, m)| (s, m.to_string())),
        );
    }

    pub fn set_current_user(&self, user: DriveUser) {
        *self.current_user.lock().unwrap() = Some(user);
    }

    pub fn list_requests(&self) -> Vec<ListFilesRequest> {
        self.list_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DriveApi for FakeDriveApi {
    async fn list_files(&self, request: &ListFilesRequest) -> Result<FileList> {
        self.list_requests.lock().unwrap().push(request.clone());
        Ok(self
            .file_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn list_shared_drives(&self, _page_token: Option<&str>, _page_size: u32) -> Result<DriveList> {
        Ok(self
            .drive_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn list_permissions(&self, file_id: &str, page_token: Option<&str>) -> Result<PermissionList> {
        self.permission_requests
            .lock()
            .unwrap()
            .push((file_id.to_string(), page_token.map(String::from)));
        Ok(self
            .permission_pages
            .lock()
            .unwrap()
            .get_mut(file_id)
            .and_then(|pages| pages.pop_front())
            .unwrap_or_default())
    }

    async fn export_file_content(&self, file_id: &str, export_mime_type: &str) -> Result<String> {
        self.export_requests
            .lock()
            .unwrap()
            .push((file_id.to_string(), export_mime_type.to_string()));
        match self.exports.lock().unwrap().get(file_id) {
            Some(Ok(content)) => Ok(content.clone()),
            Some(Err((status, message))) => Err(AppError::vendor(*status, message.clone(), false)),
            None => Ok(String::new()),
        }
    }

    async fn get_current_user(&self) -> Result<DriveUser> {
        if let Some((status, message)) = self.user_error.lock().unwrap().clone() {
            return Err(AppError::vendor(status, message, false));
        }
        Ok(self.current_user.lock().unwrap().clone().unwrap_or_default())
    }

    async fn get_file_metadata(&self, file_id: &str) -> Result<DriveFile> {
        self.metadata
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| AppError::vendor(404, format!("File not found: {}", file_id), false))
    }

    async fn stream_file(&self, file_id: &str) -> Result<ByteStream> {
        let content = self
            .contents
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .unwrap_or_default();
        let chunks: Vec<std::io::Result<Bytes>> = content
            .chunks(4)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }

    async fn create_permission(
        &self,
        file_id: &str,
        permission: &NewPermission,
        send_notification_email: bool,
    ) -> Result<()> {
        self.created_permissions.lock().unwrap().push((
            file_id.to_string(),
            permission.clone(),
            send_notification_email,
        ));
        Ok(())
    }
}

struct FakeFactory(Arc<FakeDriveApi>);

impl DriveApiFactory for FakeFactory {
    fn create(&self, _account: &DriveAccount) -> Arc<dyn DriveApi> {
        self.0.clone()
    }
}

pub fn oauth_config(token_url: &str) -> GoogleOAuthConfig {
    GoogleOAuthConfig {
        token_url: token_url.to_string(),
        ..GoogleOAuthConfig::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            "https://oauth.example.com/callback".to_string(),
        )
    }
}

pub fn app_with(api: Arc<FakeDriveApi>, settings: SyncSettings, token_url: &str) -> Router {
    let connector = GoogleDriveConnector::new(
        Arc::new(FakeFactory(api)),
        settings,
        oauth_config(token_url),
        1,
        reqwest::Client::new(),
    );
    create_app(Arc::new(connector), &ServerConfig::default())
}

pub fn app(api: Arc<FakeDriveApi>) -> Router {
    app_with(api, SyncSettings::new(50, 10), "http://127.0.0.1:9/token")
}

pub fn account() -> Value {
    json!({ "access_token": "test-token" })
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

/// `/data` request for `requested_type` with optional filter and cursor.
pub fn data_request(requested_type: &str, filter: Value, pagination: Option<Value>) -> Value {
    let mut body = json!({
        "account": account(),
        "requestedType": requested_type,
        "filter": filter,
    });
    if let Some(cursor) = pagination {
        body["pagination"] = cursor;
    }
    body
}
