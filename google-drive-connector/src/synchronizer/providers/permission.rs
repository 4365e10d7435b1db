//! Permission synchronization.
//!
//! Walks three phases in order: the selected shared drives themselves,
//! then folders, then files. Resources outside shared drives come back
//! from the listing with their permissions embedded. Shared-drive
//! resources do not, so their ids are queued on the cursor and their
//! permissions listed one resource at a time before the listing resumes.

use crate::api::{Permission, FOLDER_MIME_TYPE};
use crate::synchronizer::cursor::{
    out_of_range, DrivePhase, Pending, PermissionCursor, ResourcePhase,
};
use crate::synchronizer::providers::folder::folder_predicate;
use crate::synchronizer::sources::{
    base_query, build_sources, list_source, Source, ROOT_ID, SHARED_WITH_ME_ID,
};
use crate::synchronizer::{Page, SyncContext};
use anyhow::anyhow;
use serde::Serialize;
use sync_connector::{AppError, Result};
use tracing::debug;

/// Listing of resources with their permissions embedded.
const EMBEDDED_FIELDS: &str = "nextPageToken, files(id, driveId, permissions(id, type, role, emailAddress, displayName, photoLink, expirationTime, permissionDetails))";
/// Listing of shared-drive resources: ids only.
const SHARED_DRIVE_FIELDS: &str = "nextPageToken, files(id, driveId)";

/// A phase with nothing to list hands over to the next one without a
/// vendor call. Only the drive phase can do that, so two steps settle.
const MAX_STEPS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Drive,
    Folder,
    File,
}

impl ResourceKind {
    fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Drive => "drive",
            ResourceKind::Folder => "folder",
            ResourceKind::File => "file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynchronizedPermission {
    /// `<resourceType>_<resourceId>_<permissionId>`
    pub id: String,
    pub name: String,
    pub resource_id: String,
    pub resource_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub role_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// `"true"` or `"false"`
    pub inherited: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<String>,
}

pub fn transform(kind: ResourceKind, resource_id: &str, permission: Permission) -> SynchronizedPermission {
    let detail = permission.permission_details.into_iter().next();
    let (inherited, permission_type, inherited_from) = match detail {
        Some(d) => (d.inherited, d.permission_type, d.inherited_from),
        None => (false, None, None),
    };

    let name = permission
        .display_name
        .clone()
        .filter(|n| !n.is_empty())
        .or_else(|| permission.email_address.clone().filter(|e| !e.is_empty()))
        .unwrap_or_else(|| permission.kind.clone());

    let scoped = |k: ResourceKind| (kind == k).then(|| resource_id.to_string());

    SynchronizedPermission {
        id: format!("{}_{}_{}", kind.as_str(), resource_id, permission.id),
        name,
        resource_id: resource_id.to_string(),
        resource_type: kind.as_str(),
        drive_id: scoped(ResourceKind::Drive),
        folder_id: scoped(ResourceKind::Folder),
        file_id: scoped(ResourceKind::File),
        user_id: (permission.kind == "user").then(|| permission.id.clone()),
        role_id: permission.role,
        kind: permission.kind,
        email: permission.email_address,
        inherited: if inherited { "true" } else { "false" },
        permission_type,
        inherited_from,
        expiration_time: permission.expiration_time,
    }
}

type PermissionPage = Page<SynchronizedPermission, PermissionCursor>;

enum Step {
    Page(PermissionPage),
    Jump(PermissionCursor),
}

fn start(ctx: &SyncContext<'_>) -> PermissionCursor {
    let shared_drive_ids = ctx
        .filter
        .drive_ids()
        .iter()
        .filter(|id| *id != ROOT_ID && *id != SHARED_WITH_ME_ID)
        .cloned()
        .collect();
    PermissionCursor::Drive(DrivePhase {
        shared_drive_ids,
        shared_drive_index: 0,
        permission_page_token: None,
    })
}

fn folder_phase(ctx: &SyncContext<'_>) -> PermissionCursor {
    PermissionCursor::Folder(ResourcePhase::start(build_sources(ctx.filter.drive_ids())))
}

pub async fn fetch(
    ctx: &SyncContext<'_>,
    cursor: Option<PermissionCursor>,
) -> Result<PermissionPage> {
    let mut state = cursor.unwrap_or_else(|| start(ctx));

    for _ in 0..MAX_STEPS {
        let step = match state {
            PermissionCursor::Drive(phase) => drive_step(ctx, phase).await?,
            PermissionCursor::Folder(phase) => resource_step(ctx, ResourceKind::Folder, phase).await?,
            PermissionCursor::File(phase) => resource_step(ctx, ResourceKind::File, phase).await?,
        };
        match step {
            Step::Page(page) => return Ok(page),
            Step::Jump(next) => {
                debug!(next = ?next, "Permission phase has nothing to list");
                state = next;
            }
        }
    }

    Err(AppError::Internal(anyhow!(
        "permission cursor did not settle after {} steps",
        MAX_STEPS
    )))
}

async fn drive_step(ctx: &SyncContext<'_>, phase: DrivePhase) -> Result<Step> {
    let Some(drive_id) = phase.shared_drive_ids.get(phase.shared_drive_index) else {
        return Ok(Step::Jump(folder_phase(ctx)));
    };

    let list = ctx
        .api
        .list_permissions(drive_id, phase.permission_page_token.as_deref())
        .await?;
    let items = list
        .permissions
        .into_iter()
        .map(|p| transform(ResourceKind::Drive, drive_id, p))
        .collect();

    let next = match list.next_page_token.filter(|t| !t.is_empty()) {
        Some(token) => PermissionCursor::Drive(DrivePhase {
            permission_page_token: Some(token),
            ..phase
        }),
        None if phase.shared_drive_index + 1 < phase.shared_drive_ids.len() => {
            PermissionCursor::Drive(DrivePhase {
                shared_drive_index: phase.shared_drive_index + 1,
                permission_page_token: None,
                ..phase
            })
        }
        None => folder_phase(ctx),
    };

    Ok(Step::Page(Page {
        items,
        next: Some(next),
    }))
}

fn wrap(kind: ResourceKind, phase: ResourcePhase) -> PermissionCursor {
    match kind {
        ResourceKind::Folder => PermissionCursor::Folder(phase),
        _ => PermissionCursor::File(phase),
    }
}

/// Where to go once a resource page, and any pending work it produced, is
/// done: more of the same source, the next source, files after folders,
/// or the end.
fn after_resources(
    kind: ResourceKind,
    phase: ResourcePhase,
    resource_page_token: Option<String>,
) -> Option<PermissionCursor> {
    if let Some(token) = resource_page_token.filter(|t| !t.is_empty()) {
        return Some(wrap(
            kind,
            ResourcePhase {
                resource_page_token: Some(token),
                pending: None,
                ..phase
            },
        ));
    }
    if phase.current_source_index + 1 < phase.sources.len() {
        return Some(wrap(
            kind,
            ResourcePhase {
                current_source_index: phase.current_source_index + 1,
                resource_page_token: None,
                pending: None,
                ..phase
            },
        ));
    }
    match kind {
        ResourceKind::Folder => Some(PermissionCursor::File(ResourcePhase::start(phase.sources))),
        _ => None,
    }
}

async fn resource_step(
    ctx: &SyncContext<'_>,
    kind: ResourceKind,
    mut phase: ResourcePhase,
) -> Result<Step> {
    if let Some(pending) = phase.pending.take() {
        return drain_pending(ctx, kind, phase, pending).await;
    }

    let source = phase
        .sources
        .get(phase.current_source_index)
        .ok_or_else(|| out_of_range(phase.current_source_index, phase.sources.len()))?;

    let kind_predicate = match kind {
        ResourceKind::Folder => folder_predicate(),
        _ => format!("mimeType != '{}'", FOLDER_MIME_TYPE),
    };
    let fields = match source {
        Source::Drive(_) => SHARED_DRIVE_FIELDS,
        _ => EMBEDDED_FIELDS,
    };
    let query = base_query(Some(&kind_predicate), ctx.last_synchronized_at);
    let page = list_source(
        ctx.api,
        source,
        &query,
        phase.resource_page_token.clone(),
        ctx.settings.page_size,
        fields,
    )
    .await?;

    let mut items = Vec::new();
    let mut pending_ids = Vec::new();
    for resource in page.files {
        if resource.drive_id.is_some() {
            pending_ids.push(resource.id);
            continue;
        }
        for permission in resource.permissions.unwrap_or_default() {
            items.push(transform(kind, &resource.id, permission));
        }
    }

    let next = if pending_ids.is_empty() {
        after_resources(kind, phase, page.next_page_token)
    } else {
        Some(wrap(
            kind,
            ResourcePhase {
                resource_page_token: page.next_page_token.filter(|t| !t.is_empty()),
                pending: Some(Pending {
                    resource_ids: pending_ids,
                    index: 0,
                    permission_page_token: None,
                }),
                ..phase
            },
        ))
    };

    Ok(Step::Page(Page { items, next }))
}

async fn drain_pending(
    ctx: &SyncContext<'_>,
    kind: ResourceKind,
    phase: ResourcePhase,
    pending: Pending,
) -> Result<Step> {
    let resource_id = pending.resource_ids.get(pending.index).ok_or_else(|| {
        AppError::validation(format!(
            "Invalid pagination: pending index {} out of range ({} resources)",
            pending.index,
            pending.resource_ids.len()
        ))
    })?;

    let list = ctx
        .api
        .list_permissions(resource_id, pending.permission_page_token.as_deref())
        .await?;
    let items = list
        .permissions
        .into_iter()
        .map(|p| transform(kind, resource_id, p))
        .collect();

    let next = match list.next_page_token.filter(|t| !t.is_empty()) {
        Some(token) => Some(wrap(
            kind,
            ResourcePhase {
                pending: Some(Pending {
                    permission_page_token: Some(token),
                    ..pending
                }),
                ..phase
            },
        )),
        None if pending.index + 1 < pending.resource_ids.len() => Some(wrap(
            kind,
            ResourcePhase {
                pending: Some(Pending {
                    index: pending.index + 1,
                    permission_page_token: None,
                    ..pending
                }),
                ..phase
            },
        )),
        None => {
            let resume = phase.resource_page_token.clone();
            after_resources(kind, phase, resume)
        }
    };

    Ok(Step::Page(Page { items, next }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PermissionDetail;

    fn permission(id: &str, kind: &str) -> Permission {
        Permission {
            id: id.to_string(),
            kind: kind.to_string(),
            role: "writer".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_transform_user_permission() {
        let mut p = permission("p1", "user");
        p.email_address = Some("ann@example.com".into());
        p.permission_details = vec![PermissionDetail {
            permission_type: Some("file".into()),
            role: Some("writer".into()),
            inherited_from: Some("parent1".into()),
            inherited: true,
        }];

        let t = transform(ResourceKind::Folder, "fo1", p);
        assert_eq!(t.id, "folder_fo1_p1");
        assert_eq!(t.name, "ann@example.com");
        assert_eq!(t.folder_id.as_deref(), Some("fo1"));
        assert!(t.drive_id.is_none() && t.file_id.is_none());
        assert_eq!(t.user_id.as_deref(), Some("p1"));
        assert_eq!(t.role_id, "writer");
        assert_eq!(t.inherited, "true");
        assert_eq!(t.inherited_from.as_deref(), Some("parent1"));
    }

    #[test]
    fn test_transform_anyone_permission_falls_back_to_type() {
        let t = transform(ResourceKind::Drive, "d1", permission("anyoneWithLink", "anyone"));
        assert_eq!(t.name, "anyone");
        assert_eq!(t.drive_id.as_deref(), Some("d1"));
        assert!(t.user_id.is_none());
        assert_eq!(t.inherited, "false");
        assert!(t.permission_type.is_none());
    }

    #[test]
    fn test_after_resources_order() {
        let phase = ResourcePhase::start(vec![Source::Root, Source::SharedWithMe]);

        let same = after_resources(ResourceKind::Folder, phase.clone(), Some("t".into()));
        assert!(matches!(
            same,
            Some(PermissionCursor::Folder(ResourcePhase { current_source_index: 0, resource_page_token: Some(_), .. }))
        ));

        let next_source = after_resources(ResourceKind::Folder, phase.clone(), None);
        assert!(matches!(
            next_source,
            Some(PermissionCursor::Folder(ResourcePhase { current_source_index: 1, .. }))
        ));

        let last = ResourcePhase {
            current_source_index: 1,
            ..phase
        };
        let files = after_resources(ResourceKind::Folder, last.clone(), None);
        assert!(matches!(
            files,
            Some(PermissionCursor::File(ResourcePhase { current_source_index: 0, .. }))
        ));

        assert!(after_resources(ResourceKind::File, last, None).is_none());
    }
}
