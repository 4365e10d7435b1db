use crate::api::DriveUser;
use crate::synchronizer::cursor::SourceCursor;
use crate::synchronizer::sources::{base_query, build_sources, list_source};
use crate::synchronizer::{Page, SyncContext};
use serde::Serialize;
use std::collections::HashSet;
use sync_connector::Result;

const USER_FIELDS: &str = "nextPageToken, files(id, owners, lastModifyingUser, driveId, ownedByMe)";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynchronizedUser {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Users seen on one page, first occurrence wins.
#[derive(Default)]
struct UserCollector {
    seen: HashSet<String>,
    users: Vec<SynchronizedUser>,
}

impl UserCollector {
    fn add(&mut self, user: DriveUser) {
        let Some(id) = user.permission_id.filter(|id| !id.is_empty()) else {
            return;
        };
        if !self.seen.insert(id.clone()) {
            return;
        }

        let name = user
            .display_name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| user.email_address.clone().filter(|e| !e.is_empty()))
            .unwrap_or_else(|| "Unknown".to_string());

        self.users.push(SynchronizedUser {
            id,
            name,
            email: user.email_address,
            photo_url: user.photo_link,
        });
    }
}

/// Owners and last modifiers of the files of one source page. The very
/// first page also carries the authenticated user.
pub async fn fetch(
    ctx: &SyncContext<'_>,
    cursor: Option<SourceCursor>,
) -> Result<Page<SynchronizedUser, SourceCursor>> {
    let position =
        cursor.unwrap_or_else(|| SourceCursor::start(build_sources(ctx.filter.drive_ids())));
    let source = position.current_source()?;

    let mut collector = UserCollector::default();
    if position.page_token.is_none() && position.current_source_index == 0 {
        collector.add(ctx.api.get_current_user().await?);
    }

    let query = base_query(None, ctx.last_synchronized_at);
    let page = list_source(
        ctx.api,
        source,
        &query,
        position.page_token.clone(),
        ctx.settings.page_size,
        USER_FIELDS,
    )
    .await?;

    for file in page.files {
        for owner in file.owners {
            collector.add(owner);
        }
        if let Some(user) = file.last_modifying_user {
            collector.add(user);
        }
    }

    Ok(Page {
        items: collector.users,
        next: position.advance(page.next_page_token),
    })
}
