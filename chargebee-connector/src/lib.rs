// Chargebee connector

// Chargebee REST adapter
pub mod api;

// Server defaults and site URLs
pub mod config;

// Connector trait implementation and account model
pub mod connector;

// Entity providers, field conversions, schema
pub mod synchronizer;

pub mod descriptor;
pub mod resource;
pub mod validation;

pub use connector::{ChargebeeAccount, ChargebeeConnector};

use std::sync::Arc;
use sync_connector::ServerConfig;

/// Full HTTP surface: the generic connector routes.
pub fn create_app(connector: Arc<ChargebeeConnector>, config: &ServerConfig) -> axum::Router {
    sync_connector::api::create_router(connector, config)
}
