use crate::api::FOLDER_MIME_TYPE;
use crate::synchronizer::cursor::SourceCursor;
use crate::synchronizer::sources::{base_query, build_sources, list_source};
use crate::synchronizer::{Page, SyncContext};
use serde::Serialize;
use sync_connector::Result;

const FOLDER_FIELDS: &str =
    "nextPageToken, files(id, name, parents, driveId, createdTime, modifiedTime, webViewLink, ownedByMe)";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynchronizedFolder {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub drive_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
}

pub fn folder_predicate() -> String {
    format!("mimeType = '{}'", FOLDER_MIME_TYPE)
}

pub async fn fetch(
    ctx: &SyncContext<'_>,
    cursor: Option<SourceCursor>,
) -> Result<Page<SynchronizedFolder, SourceCursor>> {
    let position =
        cursor.unwrap_or_else(|| SourceCursor::start(build_sources(ctx.filter.drive_ids())));
    let source = position.current_source()?;

    let query = base_query(Some(&folder_predicate()), ctx.last_synchronized_at);
    let page = list_source(
        ctx.api,
        source,
        &query,
        position.page_token.clone(),
        ctx.settings.page_size,
        FOLDER_FIELDS,
    )
    .await?;

    let items = page
        .files
        .into_iter()
        .map(|folder| SynchronizedFolder {
            drive_id: source.attribute(&folder),
            parent_id: folder.parents.into_iter().next(),
            id: folder.id,
            name: folder.name,
            created_time: folder.created_time,
            modified_time: folder.modified_time,
            web_view_link: folder.web_view_link,
        })
        .collect();

    Ok(Page {
        items,
        next: position.advance(page.next_page_token),
    })
}
