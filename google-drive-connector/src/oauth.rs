//! OAuth2 authorization-code flow against Google.
//!
//! The platform drives the flow: it asks for the consent URL, sends the
//! user there, and hands the returned code back for exchange.

use crate::config::GoogleOAuthConfig;
use anyhow::Context;
use chrono::{Duration, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sync_connector::{AppError, Result};
use tracing::{debug, warn};

const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Consent screen URL. Asks for offline access and always prompts, so
/// Google issues a refresh token every time.
pub fn authorization_url(config: &GoogleOAuthConfig, callback_uri: &str, state: &str) -> String {
    let scopes = config.scopes.join(" ");
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&include_granted_scopes=true&prompt=consent&state={}",
        config.auth_url,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(callback_uri),
        urlencoding::encode(&scopes),
        urlencoding::encode(state)
    )
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Deserialize, Default)]
struct TokenError {
    error: Option<String>,
    error_description: Option<String>,
}

/// Reply to `POST /oauth2/v1/access_token`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// ISO-8601 expiry
    pub expire_on: String,
}

/// Exchange an authorization code at the token endpoint.
pub async fn exchange_code(
    http_client: &Client,
    config: &GoogleOAuthConfig,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenGrant> {
    let form = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
    ];

    debug!("Exchanging authorization code at {}", config.token_url);

    let response = http_client
        .post(&config.token_url)
        .header("Accept", "application/json")
        .form(&form)
        .send()
        .await
        .context("Failed to send token exchange request")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let error: TokenError = serde_json::from_str(&body).unwrap_or_default();
        let message = error
            .error_description
            .or(error.error)
            .unwrap_or_else(|| "Token exchange failed".to_string());
        warn!(status = status.as_u16(), "Token exchange failed: {}", message);
        return Err(AppError::vendor(status.as_u16(), message, false));
    }

    let token: TokenResponse = response
        .json()
        .await
        .context("Failed to parse token response")?;
    if token.access_token.is_empty() {
        return Err(AppError::validation("Failed to obtain access token"));
    }

    let expires_in = token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    let expire_on = (Utc::now() + Duration::seconds(expires_in))
        .to_rfc3339_opts(SecondsFormat::Millis, true);

    debug!(
        has_refresh_token = token.refresh_token.is_some(),
        expires_in, "Token exchange successful"
    );

    Ok(TokenGrant {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expire_on,
    })
}
