//! Google-specific endpoints: OAuth2 and automations.

use crate::connector::{DriveAccount, GoogleDriveConnector};
use crate::{automations, oauth};
use axum::{extract::State, response::Json, routing::post, Router};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use sync_connector::api::{parse_account, ApiJson};
use sync_connector::{AppError, Result};

pub fn routes(connector: Arc<GoogleDriveConnector>) -> Router {
    Router::new()
        .route("/oauth2/v1/authorize", post(authorize))
        .route("/oauth2/v1/access_token", post(access_token))
        .route("/api/v1/automations/action/execute", post(execute_action))
        .with_state(connector)
}

#[derive(Deserialize)]
struct AuthorizeRequest {
    callback_uri: Option<String>,
    state: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// POST /oauth2/v1/authorize - Google consent URL
async fn authorize(
    State(connector): State<Arc<GoogleDriveConnector>>,
    ApiJson(body): ApiJson<AuthorizeRequest>,
) -> Result<Json<Value>> {
    let callback_uri = non_empty(body.callback_uri)
        .ok_or_else(|| AppError::validation("callback_uri is required"))?;
    let state =
        non_empty(body.state).ok_or_else(|| AppError::validation("state is required"))?;

    let redirect_uri = oauth::authorization_url(connector.oauth(), &callback_uri, &state);
    Ok(Json(serde_json::json!({ "redirect_uri": redirect_uri })))
}

#[derive(Deserialize, Default)]
struct TokenFields {
    callback_uri: Option<String>,
}

#[derive(Deserialize)]
struct AccessTokenRequest {
    code: Option<String>,
    #[serde(default)]
    fields: Option<TokenFields>,
}

/// POST /oauth2/v1/access_token - Exchange the authorization code
async fn access_token(
    State(connector): State<Arc<GoogleDriveConnector>>,
    ApiJson(body): ApiJson<AccessTokenRequest>,
) -> Result<Json<oauth::TokenGrant>> {
    let code = non_empty(body.code)
        .ok_or_else(|| AppError::validation("Authorization code is required"))?;
    let redirect_uri = non_empty(body.fields.and_then(|f| f.callback_uri))
        .unwrap_or_else(|| connector.oauth().redirect_uri.clone());

    let grant = oauth::exchange_code(
        connector.http_client(),
        connector.oauth(),
        &code,
        &redirect_uri,
    )
    .await?;
    Ok(Json(grant))
}

#[derive(Deserialize)]
struct ActionCall {
    action: Option<String>,
    args: Option<Value>,
}

#[derive(Deserialize)]
struct ExecuteRequest {
    action: Option<ActionCall>,
    account: Option<Value>,
}

/// POST /api/v1/automations/action/execute - Run a share action
async fn execute_action(
    State(connector): State<Arc<GoogleDriveConnector>>,
    ApiJson(body): ApiJson<ExecuteRequest>,
) -> Result<Json<Value>> {
    let account: DriveAccount = parse_account(body.account)?;
    let call = body.action.ok_or_else(|| AppError::missing("action"))?;
    let action = non_empty(call.action).ok_or_else(|| AppError::missing("action.action"))?;

    automations::execute(connector.api(&account).as_ref(), &action, call.args).await?;
    Ok(Json(serde_json::json!({})))
}
