//! One provider per entity type. Each fetches a single vendor page and
//! computes the cursor of the next one.

pub mod drive;
pub mod file;
pub mod folder;
pub mod permission;
pub mod role;
pub mod user;
