use crate::api::DriveApi;
use crate::synchronizer::sources::{ROOT_ID, SHARED_WITH_ME_ID};
use sync_connector::synchronizer::{Datalist, DatalistItem};
use sync_connector::Result;

const DRIVE_PAGE_SIZE: u32 = 100;

/// Options of the `driveIds` filter: the two virtual drives, then every
/// shared drive the account can see.
pub async fn drive_options(api: &dyn DriveApi) -> Result<Datalist> {
    let mut items = vec![
        DatalistItem::new("My Drive", ROOT_ID),
        DatalistItem::new("Shared with me", SHARED_WITH_ME_ID),
    ];

    let mut page_token: Option<String> = None;
    loop {
        let page = api
            .list_shared_drives(page_token.as_deref(), DRIVE_PAGE_SIZE)
            .await?;
        items.extend(
            page.drives
                .into_iter()
                .map(|drive| DatalistItem::new(drive.name, drive.id)),
        );
        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(Datalist { items })
}
