// Google Drive connector

// Drive REST adapter
pub mod api;

// Settings: server defaults, OAuth client, sync limits
pub mod config;

// Connector trait implementation and account model
pub mod connector;

// Source sequencing, cursors and entity providers
pub mod synchronizer;

pub mod automations;
pub mod datalist;
pub mod descriptor;
pub mod oauth;
pub mod resource;
pub mod routes;

pub use connector::{DriveAccount, DriveApiFactory, GoogleApiFactory, GoogleDriveConnector};

use std::sync::Arc;
use sync_connector::ServerConfig;

/// Full HTTP surface: generic connector routes plus OAuth and automations.
pub fn create_app(connector: Arc<GoogleDriveConnector>, config: &ServerConfig) -> axum::Router {
    let extra = routes::routes(Arc::clone(&connector));
    sync_connector::api::create_router_with(connector, config, extra)
}
