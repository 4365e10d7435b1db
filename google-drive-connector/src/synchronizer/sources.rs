//! Source sequencing.
//!
//! A source is one logical partition of the user's Drive. Folder, file,
//! user and permission synchronization walk the sources left to right, one
//! vendor page at a time, and never come back to a finished source.

use crate::api::{DriveApi, DriveFile, FileList, ListFilesRequest};
use serde::{Deserialize, Serialize};
use std::fmt;
use sync_connector::Result;

/// Virtual drive id for "My Drive".
pub const ROOT_ID: &str = "root";
/// Virtual drive id for files other users shared with the account.
pub const SHARED_WITH_ME_ID: &str = "shared_with_me";
const ALL_ID: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    /// No drive filter: everything the account can see
    All,
    Root,
    SharedWithMe,
    /// A shared drive, by id
    Drive(String),
}

impl From<String> for Source {
    fn from(id: String) -> Self {
        match id.as_str() {
            ALL_ID => Source::All,
            ROOT_ID => Source::Root,
            SHARED_WITH_ME_ID => Source::SharedWithMe,
            _ => Source::Drive(id),
        }
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        match source {
            Source::All => ALL_ID.to_string(),
            Source::Root => ROOT_ID.to_string(),
            Source::SharedWithMe => SHARED_WITH_ME_ID.to_string(),
            Source::Drive(id) => id,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::All => f.write_str(ALL_ID),
            Source::Root => f.write_str(ROOT_ID),
            Source::SharedWithMe => f.write_str(SHARED_WITH_ME_ID),
            Source::Drive(id) => f.write_str(id),
        }
    }
}

/// Order the selected drive ids into sources: `root`, then
/// `shared_with_me`, then shared drives in selection order. No selection
/// means a single `all` source.
pub fn build_sources(selected: &[String]) -> Vec<Source> {
    if selected.is_empty() {
        return vec![Source::All];
    }

    let mut sources = Vec::with_capacity(selected.len());
    if selected.iter().any(|id| id == ROOT_ID) {
        sources.push(Source::Root);
    }
    if selected.iter().any(|id| id == SHARED_WITH_ME_ID) {
        sources.push(Source::SharedWithMe);
    }
    sources.extend(
        selected
            .iter()
            .filter(|id| *id != ROOT_ID && *id != SHARED_WITH_ME_ID)
            .map(|id| Source::Drive(id.clone())),
    );
    sources
}

impl Source {
    /// Extra query predicate for this source.
    fn predicate(&self) -> Option<&'static str> {
        match self {
            Source::Root => Some("'me' in owners"),
            Source::SharedWithMe => Some("sharedWithMe = true"),
            Source::All | Source::Drive(_) => None,
        }
    }

    fn drive_scope(&self) -> Option<String> {
        match self {
            Source::Drive(id) => Some(id.clone()),
            _ => None,
        }
    }

    /// Drive id an item listed from this source belongs to.
    pub fn attribute(&self, file: &DriveFile) -> String {
        match self {
            Source::SharedWithMe => SHARED_WITH_ME_ID.to_string(),
            Source::All if file.owned_by_me == Some(false) && file.drive_id.is_none() => {
                SHARED_WITH_ME_ID.to_string()
            }
            _ => file
                .drive_id
                .clone()
                .unwrap_or_else(|| ROOT_ID.to_string()),
        }
    }
}

/// Base listing predicate: kind filter, not trashed, modified since the
/// previous synchronization.
pub fn base_query(kind_predicate: Option<&str>, last_synchronized_at: Option<&str>) -> String {
    let mut clauses = Vec::with_capacity(3);
    if let Some(kind) = kind_predicate {
        clauses.push(kind.to_string());
    }
    clauses.push("trashed = false".to_string());
    if let Some(since) = last_synchronized_at {
        clauses.push(format!("modifiedTime > '{}'", escape_literal(since)));
    }
    clauses.join(" and ")
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Fetch one page of `source`.
///
/// `root` lists what the account owns and then drops anything that lives in
/// a shared drive.
pub async fn list_source(
    api: &dyn DriveApi,
    source: &Source,
    base_query: &str,
    page_token: Option<String>,
    page_size: u32,
    fields: &'static str,
) -> Result<FileList> {
    let query = match source.predicate() {
        Some(predicate) => format!("{} and {}", base_query, predicate),
        None => base_query.to_string(),
    };

    let mut page = api
        .list_files(&ListFilesRequest {
            query,
            drive_id: source.drive_scope(),
            page_token,
            page_size,
            fields,
        })
        .await?;

    if *source == Source::Root {
        page.files.retain(|f| f.drive_id.is_none());
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_selection_is_all() {
        assert_eq!(build_sources(&[]), vec![Source::All]);
    }

    #[test]
    fn test_virtual_drives_come_first() {
        let sources = build_sources(&ids(&["x", "root", "shared_with_me"]));
        assert_eq!(
            sources,
            vec![
                Source::Root,
                Source::SharedWithMe,
                Source::Drive("x".to_string())
            ]
        );
    }

    #[test]
    fn test_shared_drives_keep_selection_order() {
        let sources = build_sources(&ids(&["b", "a", "shared_with_me"]));
        let names: Vec<String> = sources.into_iter().map(String::from).collect();
        assert_eq!(names, ids(&["shared_with_me", "b", "a"]));
    }

    #[test]
    fn test_sources_serialize_as_plain_ids() {
        let json = serde_json::to_value(build_sources(&ids(&["root", "d1"]))).unwrap();
        assert_eq!(json, serde_json::json!(["root", "d1"]));

        let back: Vec<Source> = serde_json::from_value(json).unwrap();
        assert_eq!(back[1], Source::Drive("d1".to_string()));
    }

    #[test]
    fn test_attribution() {
        let shared = DriveFile {
            id: "f".into(),
            owned_by_me: Some(false),
            ..Default::default()
        };
        let in_drive = DriveFile {
            id: "g".into(),
            drive_id: Some("d1".into()),
            owned_by_me: Some(false),
            ..Default::default()
        };
        let mine = DriveFile {
            id: "h".into(),
            owned_by_me: Some(true),
            ..Default::default()
        };

        assert_eq!(Source::All.attribute(&shared), SHARED_WITH_ME_ID);
        assert_eq!(Source::All.attribute(&in_drive), "d1");
        assert_eq!(Source::All.attribute(&mine), ROOT_ID);
        assert_eq!(Source::SharedWithMe.attribute(&in_drive), SHARED_WITH_ME_ID);
        assert_eq!(Source::Root.attribute(&mine), ROOT_ID);
    }

    #[test]
    fn test_base_query() {
        let folder = "mimeType = 'application/vnd.google-apps.folder'";
        assert_eq!(
            base_query(Some(folder), None),
            format!("{} and trashed = false", folder)
        );
        assert_eq!(
            base_query(None, Some("2024-05-01T00:00:00Z")),
            "trashed = false and modifiedTime > '2024-05-01T00:00:00Z'"
        );
        assert_eq!(
            base_query(None, Some("x' or '1'='1")),
            "trashed = false and modifiedTime > 'x\\' or \\'1\\'=\\'1'"
        );
    }
}
