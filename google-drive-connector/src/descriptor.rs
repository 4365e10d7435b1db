use crate::automations::ActionKind;
use sync_connector::descriptor::{
    Action, ActionArg, AuthField, Authentication, ConnectorDescriptor, ResponsibleFor,
};

fn arg(id: &str, name: &str, description: &str) -> ActionArg {
    ActionArg {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        kind: "text".to_string(),
        text_template_supported: true,
    }
}

fn share_action(kind: ActionKind, name: &str, description: &str, resource: &str, roles: &str) -> Action {
    Action {
        action: kind.as_str().to_string(),
        name: name.to_string(),
        description: description.to_string(),
        args: vec![
            arg(
                "resourceId",
                &format!("{} ID", resource),
                &format!("Google ID of the {}", resource),
            ),
            arg(
                "emails",
                "Email Addresses",
                "Comma-separated list of email addresses to share with",
            ),
            arg("role", "Role", &format!("Access level: {}", roles)),
            arg(
                "sendNotification",
                "Send Notification",
                "Send email notification: true or false (default: true)",
            ),
        ],
    }
}

pub fn descriptor() -> ConnectorDescriptor {
    let all_roles = "Viewer, Commenter, Editor, Content Manager, or Manager";

    ConnectorDescriptor {
        id: "google-drive-connector".to_string(),
        name: "Google Drive".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        kind: "crunch".to_string(),
        description: "Sync files, folders, and users from Google Drive to Fibery".to_string(),
        authentication: vec![Authentication {
            id: "oauth2".to_string(),
            name: "Google Account".to_string(),
            description: "Connect with your Google account to access Drive files".to_string(),
            fields: vec![AuthField::input(
                "oauth",
                "Google Account",
                "Click to connect your Google account",
                "oauth",
            )],
            kind: Some("oauth2".to_string()),
            provider: Some("google".to_string()),
        }],
        sources: vec![],
        actions: vec![
            share_action(
                ActionKind::ShareDrive,
                "Share Drive",
                "Add members to a Shared Drive",
                "Drive",
                all_roles,
            ),
            share_action(
                ActionKind::ShareFolder,
                "Share Folder",
                "Share a folder with users",
                "Folder",
                all_roles,
            ),
            share_action(
                ActionKind::ShareFile,
                "Share File",
                "Share a file with users",
                "File",
                "Viewer, Commenter, or Editor",
            ),
        ],
        responsible_for: ResponsibleFor {
            data_synchronization: true,
            automations: Some(true),
            ..Default::default()
        },
    }
}
