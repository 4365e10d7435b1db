//! Pagination cursors.
//!
//! The platform echoes `nextPageConfig` back verbatim, so the cursor is the
//! only state carried between pages. Each entity type has its own shape,
//! tagged with `"type"`.

use super::sources::Source;
use super::EntityType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sync_connector::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Cursor {
    Drive(DriveCursor),
    Folder(SourceCursor),
    File(FileCursor),
    User(SourceCursor),
    Permission(PermissionCursor),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveCursor {
    pub page_token: String,
}

/// Position inside the source sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCursor {
    pub sources: Vec<Source>,
    pub current_source_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl SourceCursor {
    pub fn start(sources: Vec<Source>) -> Self {
        Self {
            sources,
            current_source_index: 0,
            page_token: None,
        }
    }

    pub fn current_source(&self) -> Result<&Source> {
        self.sources
            .get(self.current_source_index)
            .ok_or_else(|| out_of_range(self.current_source_index, self.sources.len()))
    }

    /// Same source if the vendor has more, else the next source, else done.
    pub fn advance(self, next_page_token: Option<String>) -> Option<Self> {
        match next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => Some(Self {
                page_token: Some(token),
                ..self
            }),
            None if self.current_source_index + 1 < self.sources.len() => Some(Self {
                current_source_index: self.current_source_index + 1,
                page_token: None,
                ..self
            }),
            None => None,
        }
    }
}

/// Source position plus the bytes synchronized so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCursor {
    pub sources: Vec<Source>,
    pub current_source_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[serde(default)]
    pub cumulative_size_bytes: u64,
}

impl FileCursor {
    pub fn position(&self) -> SourceCursor {
        SourceCursor {
            sources: self.sources.clone(),
            current_source_index: self.current_source_index,
            page_token: self.page_token.clone(),
        }
    }

    pub fn at(position: SourceCursor, cumulative_size_bytes: u64) -> Self {
        Self {
            sources: position.sources,
            current_source_index: position.current_source_index,
            page_token: position.page_token,
            cumulative_size_bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum PermissionCursor {
    Drive(DrivePhase),
    Folder(ResourcePhase),
    File(ResourcePhase),
}

/// Walking the permissions of the selected shared drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrivePhase {
    pub shared_drive_ids: Vec<String>,
    pub shared_drive_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_page_token: Option<String>,
}

/// Walking folders or files of every source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePhase {
    pub sources: Vec<Source>,
    pub current_source_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<Pending>,
}

impl ResourcePhase {
    pub fn start(sources: Vec<Source>) -> Self {
        Self {
            sources,
            current_source_index: 0,
            resource_page_token: None,
            pending: None,
        }
    }
}

/// Shared-drive resources whose permissions must be listed one by one
/// before resource pagination resumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pending {
    pub resource_ids: Vec<String>,
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_page_token: Option<String>,
}

impl Cursor {
    /// Decode a cursor previously returned as `nextPageConfig`.
    pub fn parse(value: Option<&Value>) -> Result<Option<Cursor>> {
        value
            .map(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| AppError::validation(format!("Invalid pagination: {}", e)))
            })
            .transpose()
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            Cursor::Drive(_) => EntityType::Drive,
            Cursor::Folder(_) => EntityType::Folder,
            Cursor::File(_) => EntityType::File,
            Cursor::User(_) => EntityType::User,
            Cursor::Permission(_) => EntityType::Permission,
        }
    }
}

/// Unwrap the cursor of the expected variant; a cursor from another
/// entity type is rejected.
pub fn expect<T>(
    cursor: Option<Cursor>,
    expected: EntityType,
    pick: impl FnOnce(Cursor) -> Option<T>,
) -> Result<Option<T>> {
    match cursor {
        None => Ok(None),
        Some(cursor) => {
            let found = cursor.entity_type();
            pick(cursor).map(Some).ok_or_else(|| {
                AppError::validation(format!(
                    "Pagination cursor for \"{}\" cannot be used to fetch \"{}\"",
                    found, expected
                ))
            })
        }
    }
}

pub fn out_of_range(index: usize, len: usize) -> AppError {
    AppError::validation(format!(
        "Invalid pagination: source index {} out of range ({} sources)",
        index, len
    ))
}
