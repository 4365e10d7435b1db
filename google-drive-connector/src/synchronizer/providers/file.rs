use crate::api::{
    DriveApi, DriveFile, DOCUMENT_MIME_TYPE, FILE_FIELDS, FOLDER_MIME_TYPE,
    PRESENTATION_MIME_TYPE, SPREADSHEET_MIME_TYPE,
};
use crate::synchronizer::cursor::{FileCursor, SourceCursor};
use crate::synchronizer::sources::{base_query, build_sources, list_source};
use crate::synchronizer::{Page, SyncContext};
use futures::future::join_all;
use serde::Serialize;
use sync_connector::{AppError, Result};
use tracing::{debug, warn};

/// Longest exported content kept, in characters.
pub const MAX_CONTENT_CHARS: usize = 100_000;
pub const TRUNCATION_MARKER: &str = "... [truncated]";

pub const EXPORT_TOO_LARGE_PLACEHOLDER: &str =
    "[Content unavailable: This file exceeds Google's 10MB export limit for Google Docs/Sheets/Slides]";
pub const EXPORT_FAILED_PLACEHOLDER: &str = "[Content unavailable: Failed to export file content]";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynchronizedFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub mime_type_category: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub drive_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modifying_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

pub fn mime_type_category(mime_type: &str) -> &'static str {
    match mime_type {
        DOCUMENT_MIME_TYPE => "Document",
        SPREADSHEET_MIME_TYPE => "Spreadsheet",
        PRESENTATION_MIME_TYPE => "Presentation",
        "application/pdf" => "PDF",
        m if m.starts_with("image/") => "Image",
        m if m.starts_with("video/") => "Video",
        m if m.starts_with("audio/") => "Audio",
        m if m.contains("zip") || m.contains("tar") || m.contains("compressed") => "Archive",
        _ => "Other",
    }
}

/// Export format for Workspace documents that carry text; `None` for
/// everything else.
pub fn export_mime_type(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        SPREADSHEET_MIME_TYPE => Some("text/csv"),
        DOCUMENT_MIME_TYPE | PRESENTATION_MIME_TYPE => Some("text/plain"),
        _ => None,
    }
}

pub fn truncate_content(content: String) -> String {
    match content.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TRUNCATION_MARKER),
        None => content,
    }
}

fn is_export_too_large(error: &AppError) -> bool {
    let message = error.to_string();
    message.contains("too large") || message.contains("exportSizeLimitExceeded")
}

/// Text content of an exportable file. Export failures never fail the
/// page; a placeholder takes the content's place.
async fn extract_content(api: &dyn DriveApi, file: &DriveFile) -> Option<String> {
    let export_as = export_mime_type(&file.mime_type)?;

    let content = match api.export_file_content(&file.id, export_as).await {
        Ok(content) => truncate_content(content),
        Err(e) if is_export_too_large(&e) => {
            warn!(file_id = %file.id, "File exceeds the 10MB export limit");
            EXPORT_TOO_LARGE_PLACEHOLDER.to_string()
        }
        Err(e) => {
            warn!(file_id = %file.id, error = %e, "Failed to export file content");
            EXPORT_FAILED_PLACEHOLDER.to_string()
        }
    };
    Some(content).filter(|c| !c.is_empty())
}

pub async fn fetch(
    ctx: &SyncContext<'_>,
    cursor: Option<FileCursor>,
) -> Result<Page<SynchronizedFile, FileCursor>> {
    let (position, synchronized_bytes) = match cursor {
        Some(cursor) => (cursor.position(), cursor.cumulative_size_bytes),
        None => (
            SourceCursor::start(build_sources(ctx.filter.drive_ids())),
            0,
        ),
    };
    let source = position.current_source()?;

    let kind = format!("mimeType != '{}'", FOLDER_MIME_TYPE);
    let query = base_query(Some(&kind), ctx.last_synchronized_at);
    let page = list_source(
        ctx.api,
        source,
        &query,
        position.page_token.clone(),
        ctx.settings.page_size,
        FILE_FIELDS,
    )
    .await?;

    // Quota counts the files this page emits, after `root` drops shared-drive
    // entries, and is checked before any export is started.
    let page_bytes: u64 = page.files.iter().map(DriveFile::size_bytes).sum();
    let total_bytes = synchronized_bytes.saturating_add(page_bytes);
    if total_bytes > ctx.settings.max_sync_size_bytes {
        return Err(AppError::QuotaExceeded {
            total_bytes,
            limit_bytes: ctx.settings.max_sync_size_bytes,
        });
    }
    debug!(source = %source, page_bytes, total_bytes, "File quota");

    let contents = join_all(page.files.iter().map(|f| extract_content(ctx.api, f))).await;

    let items = page
        .files
        .into_iter()
        .zip(contents)
        .map(|(file, content)| SynchronizedFile {
            mime_type_category: mime_type_category(&file.mime_type),
            size: file.size.as_ref().map(|_| file.size_bytes()),
            drive_id: source.attribute(&file),
            parent_id: file.parents.first().cloned(),
            owner_id: file.owners.first().and_then(|o| o.permission_id.clone()),
            last_modifying_user_id: file
                .last_modifying_user
                .as_ref()
                .and_then(|u| u.permission_id.clone()),
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            description: file.description,
            created_time: file.created_time,
            modified_time: file.modified_time,
            web_view_link: file.web_view_link,
            icon_link: file.icon_link,
            thumbnail_link: file.thumbnail_link,
            content,
        })
        .collect();

    Ok(Page {
        items,
        next: position
            .advance(page.next_page_token)
            .map(|next| FileCursor::at(next, total_bytes)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_category() {
        assert_eq!(mime_type_category(DOCUMENT_MIME_TYPE), "Document");
        assert_eq!(mime_type_category(SPREADSHEET_MIME_TYPE), "Spreadsheet");
        assert_eq!(mime_type_category("image/png"), "Image");
        assert_eq!(mime_type_category("application/pdf"), "PDF");
        assert_eq!(mime_type_category("video/mp4"), "Video");
        assert_eq!(mime_type_category("audio/mpeg"), "Audio");
        assert_eq!(mime_type_category("application/zip"), "Archive");
        assert_eq!(mime_type_category("application/x-tar"), "Archive");
        assert_eq!(mime_type_category("text/plain"), "Other");
    }

    #[test]
    fn test_export_formats() {
        assert_eq!(export_mime_type(SPREADSHEET_MIME_TYPE), Some("text/csv"));
        assert_eq!(export_mime_type(DOCUMENT_MIME_TYPE), Some("text/plain"));
        assert_eq!(export_mime_type(PRESENTATION_MIME_TYPE), Some("text/plain"));
        assert_eq!(export_mime_type("application/pdf"), None);
    }

    #[test]
    fn test_truncate_content() {
        let short = "hello".to_string();
        assert_eq!(truncate_content(short.clone()), short);

        let exact = "a".repeat(MAX_CONTENT_CHARS);
        assert_eq!(truncate_content(exact.clone()), exact);

        let long = "é".repeat(MAX_CONTENT_CHARS + 5);
        let truncated = truncate_content(long);
        assert!(truncated.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            truncated.chars().count(),
            MAX_CONTENT_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_export_limit_detection() {
        let err = AppError::vendor(403, "This file is too large to be exported.", true);
        assert!(is_export_too_large(&err));
        let err = AppError::vendor(500, "Backend error", false);
        assert!(!is_export_too_large(&err));
    }
}
