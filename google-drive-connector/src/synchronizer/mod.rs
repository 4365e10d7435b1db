//! Synchronization of Drive entities.
//!
//! [`fetch_data`] resolves the requested entity type, decodes the cursor
//! for it and runs the matching provider for exactly one page.

pub mod config;
pub mod cursor;
pub mod filter;
pub mod providers;
pub mod schema;
pub mod sources;

use crate::api::DriveApi;
use crate::config::SyncSettings;
use cursor::Cursor;
use filter::DriveFilter;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use sync_connector::{AppError, DataQuery, Result, SynchronizationType, SynchronizerData};
use tracing::debug;

/// Entity types this connector synchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Drive,
    Folder,
    File,
    User,
    Permission,
    Role,
}

impl EntityType {
    pub const ALL: [EntityType; 6] = [
        EntityType::Drive,
        EntityType::Folder,
        EntityType::File,
        EntityType::User,
        EntityType::Permission,
        EntityType::Role,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Drive => "drive",
            EntityType::Folder => "folder",
            EntityType::File => "file",
            EntityType::User => "user",
            EntityType::Permission => "permission",
            EntityType::Role => "role",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("invalid \"requestedType\" {}", s)))
    }
}

/// Inputs shared by every provider for one `/data` call.
pub struct SyncContext<'a> {
    pub api: &'a dyn DriveApi,
    pub settings: &'a SyncSettings,
    pub filter: DriveFilter,
    pub last_synchronized_at: Option<&'a str>,
}

/// Items of one page and the cursor of the next, if any.
pub struct Page<T, C> {
    pub items: Vec<T>,
    pub next: Option<C>,
}

impl<T: Serialize, C> Page<T, C> {
    fn into_data(
        self,
        synchronization_type: SynchronizationType,
        wrap: impl FnOnce(C) -> Cursor,
    ) -> Result<SynchronizerData<Value, Value>> {
        SynchronizerData::new(self.items, synchronization_type, self.next.map(wrap)).into_json()
    }
}

/// Fetch one page of `query.requested_type`.
pub async fn fetch_data<A>(
    api: &dyn DriveApi,
    settings: &SyncSettings,
    query: &DataQuery<A>,
) -> Result<SynchronizerData<Value, Value>> {
    let entity: EntityType = query.requested_type.parse()?;
    let cursor = Cursor::parse(query.pagination.as_ref())?;
    let synchronization_type = query.synchronization_type();

    let ctx = SyncContext {
        api,
        settings,
        filter: DriveFilter::parse(query.filter.as_ref())?,
        last_synchronized_at: query.last_synchronized_at(),
    };

    debug!(
        requested_type = %entity,
        cursor = ?cursor,
        last_synchronized_at = ?ctx.last_synchronized_at,
        "Fetching page"
    );

    match entity {
        EntityType::Drive => {
            let cursor = cursor::expect(cursor, entity, |c| match c {
                Cursor::Drive(c) => Some(c),
                _ => None,
            })?;
            providers::drive::fetch(&ctx, cursor)
                .await?
                .into_data(synchronization_type, Cursor::Drive)
        }
        EntityType::Folder => {
            let cursor = cursor::expect(cursor, entity, |c| match c {
                Cursor::Folder(c) => Some(c),
                _ => None,
            })?;
            providers::folder::fetch(&ctx, cursor)
                .await?
                .into_data(synchronization_type, Cursor::Folder)
        }
        EntityType::File => {
            let cursor = cursor::expect(cursor, entity, |c| match c {
                Cursor::File(c) => Some(c),
                _ => None,
            })?;
            providers::file::fetch(&ctx, cursor)
                .await?
                .into_data(synchronization_type, Cursor::File)
        }
        EntityType::User => {
            let cursor = cursor::expect(cursor, entity, |c| match c {
                Cursor::User(c) => Some(c),
                _ => None,
            })?;
            providers::user::fetch(&ctx, cursor)
                .await?
                .into_data(synchronization_type, Cursor::User)
        }
        EntityType::Permission => {
            let cursor = cursor::expect(cursor, entity, |c| match c {
                Cursor::Permission(c) => Some(c),
                _ => None,
            })?;
            providers::permission::fetch(&ctx, cursor)
                .await?
                .into_data(synchronization_type, Cursor::Permission)
        }
        EntityType::Role => {
            // Single page, nothing to resume
            cursor::expect(cursor, entity, |_| None::<()>)?;
            SynchronizerData::new(
                providers::role::roles(),
                synchronization_type,
                None::<Value>,
            )
            .into_json()
        }
    }
}
