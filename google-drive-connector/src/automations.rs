//! Automation actions: sharing drives, folders and files.

use crate::api::{DriveApi, NewPermission};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use sync_connector::{AppError, Result};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    ShareDrive,
    ShareFolder,
    ShareFile,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::ShareDrive => "share-drive",
            ActionKind::ShareFolder => "share-folder",
            ActionKind::ShareFile => "share-file",
        }
    }
}

impl FromStr for ActionKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "share-drive" => Ok(ActionKind::ShareDrive),
            "share-folder" => Ok(ActionKind::ShareFolder),
            "share-file" => Ok(ActionKind::ShareFile),
            other => Err(AppError::validation(format!("Unknown action: {}", other))),
        }
    }
}

/// Arguments of a share action, as filled in by the user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareArgs {
    #[serde(default)]
    pub resource_id: Option<String>,
    /// Comma-separated
    #[serde(default)]
    pub emails: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Anything but `false` / `"false"` notifies
    #[serde(default)]
    pub send_notification: Option<Value>,
}

/// Map a role as typed by the user (display or API name, any case) to the
/// Drive API role.
pub fn api_role(role: &str) -> Option<&'static str> {
    match role.trim().to_lowercase().as_str() {
        "viewer" | "reader" => Some("reader"),
        "commenter" => Some("commenter"),
        "editor" | "writer" => Some("writer"),
        "content manager" | "fileorganizer" => Some("fileOrganizer"),
        "manager" | "organizer" => Some("organizer"),
        _ => None,
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::validation(format!("\"{}\" is required", name)))
}

fn notify(send_notification: &Option<Value>) -> bool {
    match send_notification {
        Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => s != "false",
        _ => true,
    }
}

/// Grant `role` on the resource to every listed email, one permission per
/// address. Stops at the first vendor failure.
pub async fn execute(api: &dyn DriveApi, action: &str, args: Option<Value>) -> Result<()> {
    let kind: ActionKind = action.parse()?;
    let args: ShareArgs = match args {
        None | Some(Value::Null) => ShareArgs::default(),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| AppError::validation(format!("Invalid action args: {}", e)))?,
    };

    let resource_id = required(&args.resource_id, "resourceId")?;
    let emails = required(&args.emails, "emails")?;
    let role = required(&args.role, "role")?;

    let recipients: Vec<&str> = emails
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect();
    if recipients.is_empty() {
        return Err(AppError::validation("No valid email addresses provided"));
    }

    let api_role = api_role(role).ok_or_else(|| {
        AppError::validation(format!(
            "Invalid role \"{}\". Valid roles: Viewer, Commenter, Editor, Content Manager, Manager",
            role
        ))
    })?;
    let notify = notify(&args.send_notification);

    info!(
        action = kind.as_str(),
        resource_id,
        recipients = recipients.len(),
        role = api_role,
        "Sharing resource"
    );

    for email in recipients {
        let permission = NewPermission {
            kind: "user".to_string(),
            role: api_role.to_string(),
            email_address: email.to_string(),
        };
        if let Err(e) = api.create_permission(resource_id, &permission, notify).await {
            error!(resource_id, email, error = %e, "Failed to share resource");
            return Err(e);
        }
        info!(resource_id, email, role = api_role, "Shared resource");
    }
    Ok(())
}
