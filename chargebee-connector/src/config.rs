//! Chargebee connector settings.

use sync_connector::ServerConfig;

/// Server defaults for this connector, before file/env overrides.
pub fn server_defaults() -> ServerConfig {
    ServerConfig {
        port: 3500,
        page_size: 50,
        max_concurrent_connections: 100,
        api_version: 2,
        ..Default::default()
    }
}

/// Chargebee API v2 root of a site.
pub fn site_base_url(site: &str) -> String {
    format!("https://{}.chargebee.com/api/v2", site)
}

/// Link to an entity in the Chargebee web app.
pub fn app_url(site: &str, path: &str, id: &str) -> String {
    format!("https://{}.chargebee.com/d/{}/{}", site, path, id)
}
