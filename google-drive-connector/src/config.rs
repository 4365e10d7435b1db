//! Google Drive connector settings.

use anyhow::{Context, Result};
use sync_connector::ServerConfig;

/// Google Drive API v3 base URL
pub const BASE_URL: &str = "https://www.googleapis.com/drive/v3";

pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

pub const DEFAULT_REDIRECT_URI: &str = "https://oauth-svc.fibery.io";

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.readonly",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

pub const DEFAULT_MAX_SYNC_SIZE_GB: u64 = 10;

const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

/// Server defaults for this connector, before file/env overrides.
pub fn server_defaults() -> ServerConfig {
    ServerConfig {
        port: 3511,
        page_size: 50,
        max_concurrent_connections: 10,
        api_version: 1,
        ..Default::default()
    }
}

/// OAuth client registered with Google.
#[derive(Clone, Debug)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Used when the token request does not carry its own callback URI
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
}

impl GoogleOAuthConfig {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Read `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET` and
    /// `GOOGLE_REDIRECT_URI` (optional).
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").context("GOOGLE_CLIENT_ID is required")?;
        let client_secret =
            std::env::var("GOOGLE_CLIENT_SECRET").context("GOOGLE_CLIENT_SECRET is required")?;
        let redirect_uri = std::env::var("GOOGLE_REDIRECT_URI")
            .unwrap_or_else(|_| DEFAULT_REDIRECT_URI.to_string());
        Ok(Self::new(client_id, client_secret, redirect_uri))
    }
}

/// Per-page synchronization limits.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncSettings {
    /// Page size for resource listings
    pub page_size: u32,
    /// Ceiling on the cumulative size of synchronized files
    pub max_sync_size_bytes: u64,
}

impl SyncSettings {
    pub fn new(page_size: u32, max_sync_size_gb: u64) -> Self {
        Self {
            page_size,
            max_sync_size_bytes: max_sync_size_gb * BYTES_PER_GB,
        }
    }

    /// `MAX_SYNC_SIZE_GB` overrides the default ceiling.
    pub fn from_env(page_size: u32) -> Self {
        let gb = std::env::var("MAX_SYNC_SIZE_GB")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_MAX_SYNC_SIZE_GB);
        Self::new(page_size, gb)
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::new(50, DEFAULT_MAX_SYNC_SIZE_GB)
    }
}
