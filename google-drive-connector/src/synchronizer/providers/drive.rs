use crate::synchronizer::cursor::DriveCursor;
use crate::synchronizer::sources::{ROOT_ID, SHARED_WITH_ME_ID};
use crate::synchronizer::{Page, SyncContext};
use serde::Serialize;
use sync_connector::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynchronizedDrive {
    pub id: String,
    pub name: String,
    /// `Personal`, `Shared With Me` or `Shared`
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_rgb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    pub web_view_link: String,
}

fn virtual_drives() -> [SynchronizedDrive; 2] {
    [
        SynchronizedDrive {
            id: ROOT_ID.to_string(),
            name: "My Drive".to_string(),
            kind: "Personal",
            color_rgb: None,
            created_time: None,
            web_view_link: "https://drive.google.com/drive/my-drive".to_string(),
        },
        SynchronizedDrive {
            id: SHARED_WITH_ME_ID.to_string(),
            name: "Shared with me".to_string(),
            kind: "Shared With Me",
            color_rgb: None,
            created_time: None,
            web_view_link: "https://drive.google.com/drive/shared-with-me".to_string(),
        },
    ]
}

/// The virtual drives on the first page, then shared drives.
pub async fn fetch(
    ctx: &SyncContext<'_>,
    cursor: Option<DriveCursor>,
) -> Result<Page<SynchronizedDrive, DriveCursor>> {
    let page_token = cursor.map(|c| c.page_token);

    let mut items = Vec::new();
    if page_token.is_none() {
        items.extend(virtual_drives());
    }

    let page = ctx
        .api
        .list_shared_drives(page_token.as_deref(), ctx.settings.page_size)
        .await?;

    items.extend(page.drives.into_iter().map(|drive| SynchronizedDrive {
        web_view_link: format!("https://drive.google.com/drive/folders/{}", drive.id),
        id: drive.id,
        name: drive.name,
        kind: "Shared",
        color_rgb: drive.color_rgb,
        created_time: drive.created_time,
    }));

    let selected = ctx.filter.drive_ids();
    if !selected.is_empty() {
        items.retain(|drive| selected.contains(&drive.id));
    }

    Ok(Page {
        items,
        next: page
            .next_page_token
            .filter(|t| !t.is_empty())
            .map(|page_token| DriveCursor { page_token }),
    })
}
