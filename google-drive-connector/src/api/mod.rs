//! Google Drive API adapter.
//!
//! [`DriveApi`] is the narrow surface the synchronizer needs from Drive.
//! [`GoogleDriveClient`] implements it over the REST API; tests substitute
//! an in-memory fake.

mod client;

pub use client::GoogleDriveClient;

use async_trait::async_trait;
use axum::body::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use sync_connector::Result;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
pub const DOCUMENT_MIME_TYPE: &str = "application/vnd.google-apps.document";
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";
pub const PRESENTATION_MIME_TYPE: &str = "application/vnd.google-apps.presentation";

/// Default `fields` selector for file listings.
pub const FILE_FIELDS: &str = "nextPageToken, files(id, name, mimeType, description, createdTime, modifiedTime, size, webViewLink, iconLink, thumbnailLink, parents, driveId, owners, lastModifyingUser, trashed, ownedByMe, shared)";

/// Drive user, as embedded in files or returned by `about`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveUser {
    pub permission_id: Option<String>,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub photo_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDetail {
    pub permission_type: Option<String>,
    pub role: Option<String>,
    pub inherited_from: Option<String>,
    #[serde(default)]
    pub inherited: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,
    /// `user`, `group`, `domain` or `anyone`
    #[serde(rename = "type")]
    pub kind: String,
    pub role: String,
    pub email_address: Option<String>,
    pub display_name: Option<String>,
    pub photo_link: Option<String>,
    pub expiration_time: Option<String>,
    #[serde(default)]
    pub permission_details: Vec<PermissionDetail>,
}

/// File or folder metadata. Every field but `id` depends on the `fields`
/// selector of the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    pub description: Option<String>,
    pub created_time: Option<String>,
    pub modified_time: Option<String>,
    /// Bytes, as a decimal string. Absent for folders and Workspace files.
    pub size: Option<String>,
    pub web_view_link: Option<String>,
    pub icon_link: Option<String>,
    pub thumbnail_link: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
    pub drive_id: Option<String>,
    #[serde(default)]
    pub owners: Vec<DriveUser>,
    pub last_modifying_user: Option<DriveUser>,
    pub owned_by_me: Option<bool>,
    /// Only present for resources outside shared drives
    pub permissions: Option<Vec<Permission>>,
}

impl DriveFile {
    /// Reported size in bytes; absent or unparseable counts as zero.
    pub fn size_bytes(&self) -> u64 {
        self.size
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// A shared drive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDrive {
    pub id: String,
    pub name: String,
    pub color_rgb: Option<String>,
    pub created_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveList {
    #[serde(default)]
    pub drives: Vec<SharedDrive>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionList {
    #[serde(default)]
    pub permissions: Vec<Permission>,
    pub next_page_token: Option<String>,
}

/// Parameters of a `files.list` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ListFilesRequest {
    pub query: String,
    /// Restrict to one shared drive (`corpora=drive`)
    pub drive_id: Option<String>,
    pub page_token: Option<String>,
    pub page_size: u32,
    pub fields: &'static str,
}

/// A permission to grant through `permissions.create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPermission {
    #[serde(rename = "type")]
    pub kind: String,
    pub role: String,
    pub email_address: String,
}

pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

#[async_trait]
pub trait DriveApi: Send + Sync {
    async fn list_files(&self, request: &ListFilesRequest) -> Result<FileList>;

    async fn list_shared_drives(&self, page_token: Option<&str>, page_size: u32)
        -> Result<DriveList>;

    async fn list_permissions(&self, file_id: &str, page_token: Option<&str>)
        -> Result<PermissionList>;

    /// Export a Google Workspace document as text.
    async fn export_file_content(&self, file_id: &str, export_mime_type: &str) -> Result<String>;

    /// The authenticated user (`about.user`).
    async fn get_current_user(&self) -> Result<DriveUser>;

    async fn get_file_metadata(&self, file_id: &str) -> Result<DriveFile>;

    /// Binary content (`alt=media`).
    async fn stream_file(&self, file_id: &str) -> Result<ByteStream>;

    async fn create_permission(
        &self,
        file_id: &str,
        permission: &NewPermission,
        send_notification_email: bool,
    ) -> Result<()>;
}
