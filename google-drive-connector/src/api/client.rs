use super::{
    ByteStream, DriveApi, DriveFile, DriveList, DriveUser, FileList, ListFilesRequest,
    NewPermission, PermissionList,
};
use crate::config::BASE_URL;
use anyhow::Context;
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use sync_connector::{AppError, ConcurrencyLimiter, Result};
use tracing::{debug, warn};

const PERMISSION_FIELDS: &str = "nextPageToken, permissions(id, type, role, emailAddress, displayName, photoLink, expirationTime, permissionDetails)";
const PERMISSION_PAGE_SIZE: &str = "100";

/// HTTP client for the Google Drive REST API.
///
/// Authenticates with the account's OAuth access token. Every request
/// waits for a slot in the shared [`ConcurrencyLimiter`] before it is sent.
pub struct GoogleDriveClient {
    access_token: String,
    http_client: Client,
    base_url: String,
    limiter: ConcurrencyLimiter,
}

impl GoogleDriveClient {
    pub fn new(http_client: Client, access_token: String, limiter: ConcurrencyLimiter) -> Self {
        Self::with_base_url(http_client, access_token, BASE_URL.to_string(), limiter)
    }

    /// Create a client with a custom base URL (for testing with a mock server).
    pub fn with_base_url(
        http_client: Client,
        access_token: String,
        base_url: String,
        limiter: ConcurrencyLimiter,
    ) -> Self {
        Self {
            access_token,
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http_client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.access_token)
    }

    /// Send through the limiter and map vendor failures.
    ///
    /// The slot is released once the headers arrive, so only use this when
    /// the body is handed on as a stream or ignored.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        self.send_with(request, |response| async move { Ok(response) })
            .await
    }

    /// Send through the limiter and consume the body with `read` while the
    /// slot is still held.
    async fn send_with<T, F, Fut>(&self, request: RequestBuilder, read: F) -> Result<T>
    where
        F: FnOnce(Response) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.limiter
            .run(async {
                let response = request.send().await.map_err(transport_error)?;
                read(check_response(response).await?).await
            })
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        self.send_with(request, |response| async move {
            let parsed = response
                .json::<T>()
                .await
                .with_context(|| format!("Failed to parse {} response", what))?;
            Ok(parsed)
        })
        .await
    }
}

fn file_path(file_id: &str) -> String {
    format!("/files/{}", urlencoding::encode(file_id))
}

#[async_trait]
impl DriveApi for GoogleDriveClient {
    async fn list_files(&self, request: &ListFilesRequest) -> Result<FileList> {
        let mut query = vec![
            ("q", request.query.clone()),
            ("pageSize", request.page_size.to_string()),
            ("supportsAllDrives", "true".to_string()),
            ("includeItemsFromAllDrives", "true".to_string()),
            ("fields", request.fields.to_string()),
            ("orderBy", "modifiedTime desc".to_string()),
        ];
        if let Some(token) = &request.page_token {
            query.push(("pageToken", token.clone()));
        }
        if let Some(drive_id) = &request.drive_id {
            query.push(("corpora", "drive".to_string()));
            query.push(("driveId", drive_id.clone()));
        }

        debug!(query = %request.query, drive_id = ?request.drive_id, "files.list");
        self.get_json(self.get("/files").query(&query), "files.list")
            .await
    }

    async fn list_shared_drives(
        &self,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<DriveList> {
        let mut query = vec![
            ("pageSize", page_size.to_string()),
            (
                "fields",
                "nextPageToken, drives(id, name, colorRgb, createdTime)".to_string(),
            ),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }
        self.get_json(self.get("/drives").query(&query), "drives.list")
            .await
    }

    async fn list_permissions(
        &self,
        file_id: &str,
        page_token: Option<&str>,
    ) -> Result<PermissionList> {
        let mut query = vec![
            ("pageSize", PERMISSION_PAGE_SIZE.to_string()),
            ("supportsAllDrives", "true".to_string()),
            ("fields", PERMISSION_FIELDS.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }
        let path = format!("{}/permissions", file_path(file_id));
        self.get_json(self.get(&path).query(&query), "permissions.list")
            .await
    }

    async fn export_file_content(&self, file_id: &str, export_mime_type: &str) -> Result<String> {
        let path = format!("{}/export", file_path(file_id));
        let request = self.get(&path).query(&[("mimeType", export_mime_type)]);
        self.send_with(request, |response| async move {
            let text = response
                .text()
                .await
                .context("Failed to read exported content")?;
            Ok(text)
        })
        .await
    }

    async fn get_current_user(&self) -> Result<DriveUser> {
        #[derive(Deserialize)]
        struct About {
            #[serde(default)]
            user: DriveUser,
        }

        let request = self.get("/about").query(&[(
            "fields",
            "user(displayName, emailAddress, permissionId, photoLink)",
        )]);
        let about: About = self.get_json(request, "about.get").await?;
        Ok(about.user)
    }

    async fn get_file_metadata(&self, file_id: &str) -> Result<DriveFile> {
        let request = self.get(&file_path(file_id)).query(&[
            ("supportsAllDrives", "true"),
            ("fields", "id, name, mimeType, size"),
        ]);
        self.get_json(request, "files.get").await
    }

    async fn stream_file(&self, file_id: &str) -> Result<ByteStream> {
        let request = self
            .get(&file_path(file_id))
            .query(&[("alt", "media"), ("supportsAllDrives", "true")]);
        let response = self.send(request).await?;
        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        Ok(Box::pin(stream))
    }

    async fn create_permission(
        &self,
        file_id: &str,
        permission: &NewPermission,
        send_notification_email: bool,
    ) -> Result<()> {
        let path = format!("{}/permissions", file_path(file_id));
        let request = self
            .http_client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.access_token)
            .query(&[
                ("supportsAllDrives", "true".to_string()),
                ("sendNotificationEmail", send_notification_email.to_string()),
            ])
            .json(permission);
        self.send(request).await?;
        Ok(())
    }
}

/// Google error body: `{"error": {"code", "message", "errors": [{"message", "reason"}]}}`
#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Deserialize, Default)]
struct ErrorDetail {
    code: Option<u16>,
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Deserialize)]
struct ErrorItem {
    message: Option<String>,
}

async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let error = vendor_error(status.as_u16(), &body);
    warn!(status = status.as_u16(), "Google Drive API error: {}", error);
    Err(error)
}

/// Map a failed response to a vendor error.
///
/// The message is the first detailed error, else the top-level message.
/// 429 and 403 (rate limit / quota) are retryable.
pub(crate) fn vendor_error(http_status: u16, body: &str) -> AppError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .unwrap_or_default()
        .error;

    let status = detail.code.unwrap_or(http_status);
    let message = detail
        .errors
        .into_iter()
        .find_map(|e| e.message.filter(|m| !m.is_empty()))
        .or(detail.message.filter(|m| !m.is_empty()))
        .unwrap_or_else(|| "Google Drive API error".to_string());

    AppError::vendor(status, message, status == 429 || status == 403)
}

fn transport_error(error: reqwest::Error) -> AppError {
    let status = error.status().map(|s| s.as_u16()).unwrap_or(500);
    AppError::vendor(status, error.to_string(), status == 429 || status == 403)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use mockito::{Matcher, Server};
    use std::time::{Duration, Instant};

    fn client(server: &Server) -> GoogleDriveClient {
        GoogleDriveClient::with_base_url(
            Client::new(),
            "test_token".to_string(),
            server.url(),
            ConcurrencyLimiter::new(2),
        )
    }

    #[test]
    fn test_vendor_error_prefers_detailed_message() {
        let body = r#"{"error": {"code": 403, "message": "top", "errors": [{"message": "User rate limit exceeded", "reason": "userRateLimitExceeded"}]}}"#;
        match vendor_error(403, body) {
            AppError::Vendor {
                status,
                message,
                try_later,
            } => {
                assert_eq!(status, 403);
                assert_eq!(message, "User rate limit exceeded");
                assert!(try_later);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_vendor_error_falls_back_to_top_level_then_generic() {
        let err = vendor_error(404, r#"{"error": {"code": 404, "message": "File not found: x"}}"#);
        assert_eq!(err.to_string(), "File not found: x");
        assert_eq!(err.try_later(), Some(false));

        let err = vendor_error(502, "<html>bad gateway</html>");
        assert_eq!(err.to_string(), "Google Drive API error");
        assert_eq!(err.status_code().as_u16(), 502);
    }

    #[test]
    fn test_rate_limit_is_retryable() {
        let err = vendor_error(429, "");
        assert_eq!(err.try_later(), Some(true));
    }

    #[tokio::test]
    async fn test_list_files_sends_query_and_scope() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/files")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "trashed = false".into()),
                Matcher::UrlEncoded("corpora".into(), "drive".into()),
                Matcher::UrlEncoded("driveId".into(), "d1".into()),
                Matcher::UrlEncoded("pageToken".into(), "tok".into()),
                Matcher::UrlEncoded("supportsAllDrives".into(), "true".into()),
            ]))
            .match_header("authorization", "Bearer test_token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"files": [{"id": "f1", "name": "a.txt", "mimeType": "text/plain"}]}"#)
            .create_async()
            .await;

        let list = client(&server)
            .list_files(&ListFilesRequest {
                query: "trashed = false".to_string(),
                drive_id: Some("d1".to_string()),
                page_token: Some("tok".to_string()),
                page_size: 50,
                fields: super::super::FILE_FIELDS,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(list.files.len(), 1);
        assert_eq!(list.files[0].name, "a.txt");
        assert!(list.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_list_files_maps_vendor_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/files")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"code": 429, "message": "Rate Limit Exceeded"}}"#)
            .create_async()
            .await;

        let err = client(&server)
            .list_files(&ListFilesRequest {
                query: "trashed = false".to_string(),
                drive_id: None,
                page_token: None,
                page_size: 50,
                fields: super::super::FILE_FIELDS,
            })
            .await
            .unwrap_err();

        assert_eq!(err.status_code().as_u16(), 429);
        assert_eq!(err.try_later(), Some(true));
        assert_eq!(err.to_string(), "Rate Limit Exceeded");
    }

    #[tokio::test]
    async fn test_list_shared_drives() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/drives")
            .match_query(Matcher::UrlEncoded("pageSize".into(), "100".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"drives": [{"id": "d1", "name": "Team Drive"}], "nextPageToken": "n"}"#)
            .create_async()
            .await;

        let list = client(&server).list_shared_drives(None, 100).await.unwrap();
        assert_eq!(list.drives[0].name, "Team Drive");
        assert_eq!(list.next_page_token.as_deref(), Some("n"));
    }

    #[tokio::test]
    async fn test_get_current_user() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/about")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"user": {"permissionId": "me1", "displayName": "Me", "emailAddress": "me@example.com"}}"#)
            .create_async()
            .await;

        let user = client(&server).get_current_user().await.unwrap();
        assert_eq!(user.permission_id.as_deref(), Some("me1"));
        assert_eq!(user.email_address.as_deref(), Some("me@example.com"));
    }

    #[tokio::test]
    async fn test_export_returns_text() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/files/doc1/export")
            .match_query(Matcher::UrlEncoded("mimeType".into(), "text/csv".into()))
            .with_status(200)
            .with_body("a,b\n1,2\n")
            .create_async()
            .await;

        let text = client(&server)
            .export_file_content("doc1", "text/csv")
            .await
            .unwrap();
        assert_eq!(text, "a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_export_holds_slot_until_body_is_read() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/files/slow/export")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_chunked_body(|w| {
                w.write_all(b"a,b\n")?;
                std::thread::sleep(Duration::from_millis(300));
                w.write_all(b"1,2\n")
            })
            .expect(2)
            .create_async()
            .await;

        let limiter = ConcurrencyLimiter::new(1);
        let client = GoogleDriveClient::with_base_url(
            Client::new(),
            "test_token".to_string(),
            server.url(),
            limiter.clone(),
        );

        let started = Instant::now();
        let export = || client.export_file_content("slow", "text/csv");
        let observe = async {
            tokio::time::sleep(Duration::from_millis(150)).await;
            limiter.available()
        };
        let (first, second, available_mid_body) = tokio::join!(export(), export(), observe);

        assert_eq!(first.unwrap(), "a,b\n1,2\n");
        assert_eq!(second.unwrap(), "a,b\n1,2\n");
        assert_eq!(available_mid_body, 0);
        assert!(started.elapsed() >= Duration::from_millis(600));
        assert_eq!(limiter.available(), 1);
    }

    #[tokio::test]
    async fn test_stream_file_yields_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/files/bin1")
            .match_query(Matcher::UrlEncoded("alt".into(), "media".into()))
            .with_status(200)
            .with_body("binary-content")
            .create_async()
            .await;

        let mut stream = client(&server).stream_file("bin1").await.unwrap();
        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"binary-content");
    }

    #[tokio::test]
    async fn test_create_permission_posts_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/files/f1/permissions")
            .match_query(Matcher::UrlEncoded(
                "sendNotificationEmail".into(),
                "false".into(),
            ))
            .match_body(Matcher::Json(serde_json::json!({
                "type": "user",
                "role": "writer",
                "emailAddress": "a@example.com"
            })))
            .with_status(200)
            .with_body(r#"{"id": "p1"}"#)
            .create_async()
            .await;

        client(&server)
            .create_permission(
                "f1",
                &NewPermission {
                    kind: "user".to_string(),
                    role: "writer".to_string(),
                    email_address: "a@example.com".to_string(),
                },
                false,
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
