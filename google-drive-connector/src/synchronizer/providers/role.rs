use serde::Serialize;

/// Drive permission role. `canEdit`, `canComment` and `canShare` are
/// `"true"`/`"false"` strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynchronizedRole {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub level: u32,
    pub can_edit: &'static str,
    pub can_comment: &'static str,
    pub can_share: &'static str,
}

const fn role(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    level: u32,
    (edit, comment, share): (bool, bool, bool),
) -> SynchronizedRole {
    SynchronizedRole {
        id,
        name,
        description,
        level,
        can_edit: flag(edit),
        can_comment: flag(comment),
        can_share: flag(share),
    }
}

const fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

const ROLES: [SynchronizedRole; 6] = [
    role(
        "owner",
        "Owner",
        "Full ownership of the file. Can edit, comment, share, and delete.",
        100,
        (true, true, true),
    ),
    role(
        "organizer",
        "Manager",
        "Shared Drive manager. Can manage members, content, and settings.",
        90,
        (true, true, true),
    ),
    role(
        "fileOrganizer",
        "Content Manager",
        "Can add, edit, move, and delete content in a Shared Drive.",
        80,
        (true, true, false),
    ),
    role(
        "writer",
        "Editor",
        "Can edit the file and add comments.",
        70,
        (true, true, false),
    ),
    role(
        "commenter",
        "Commenter",
        "Can view and add comments but cannot edit.",
        50,
        (false, true, false),
    ),
    role(
        "reader",
        "Viewer",
        "Can view but cannot edit or comment.",
        10,
        (false, false, false),
    ),
];

/// Roles are static and fit on one page.
pub fn roles() -> Vec<SynchronizedRole> {
    ROLES.to_vec()
}
