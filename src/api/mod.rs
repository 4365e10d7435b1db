// HTTP surface shared by every connector

pub mod correlation;
mod json;
mod synchronizer;

pub use correlation::{correlation_id, CORRELATION_ID_HEADER};
pub use json::ApiJson;

use crate::config::ServerConfig;
use crate::connector::{Connector, ValidatedAccount};
use crate::descriptor::ConnectorDescriptor;
use crate::error::{AppError, ErrorResponse, Result};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Build the router for a connector.
pub fn create_router<C: Connector>(connector: Arc<C>, config: &ServerConfig) -> Router {
    create_router_with(connector, config, Router::new())
}

/// Build the router for a connector, merging connector-specific routes
/// (OAuth, automations) so they share the fallback and middleware stack.
pub fn create_router_with<C: Connector>(
    connector: Arc<C>,
    config: &ServerConfig,
    extra: Router,
) -> Router {
    Router::new()
        .route("/", get(descriptor::<C>))
        .route("/status", get(status))
        .route("/logo", get(logo::<C>))
        .route("/validate", post(validate::<C>))
        .merge(synchronizer::routes::<C>())
        .with_state(connector)
        .merge(extra)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(correlation_id))
}

/// Deserialize the `account` object of a request into the connector's
/// credential type.
pub fn parse_account<A: DeserializeOwned>(account: Option<Value>) -> Result<A> {
    match account {
        None | Some(Value::Null) => Err(AppError::missing("account")),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| AppError::validation(format!("Invalid account: {}", e))),
    }
}

/// GET / - Connector descriptor
async fn descriptor<C: Connector>(State(connector): State<Arc<C>>) -> Json<ConnectorDescriptor> {
    Json(connector.descriptor())
}

/// GET /status - Liveness
async fn status() -> Json<Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// GET /logo
async fn logo<C: Connector>(State(connector): State<Arc<C>>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], connector.logo())
}

#[derive(Deserialize)]
struct ValidateRequest {
    fields: Option<Value>,
}

/// POST /validate - Check credentials, reply with the account name
async fn validate<C: Connector>(
    State(connector): State<Arc<C>>,
    ApiJson(body): ApiJson<ValidateRequest>,
) -> Result<Json<ValidatedAccount>> {
    let account: C::Account = match body.fields {
        None | Some(Value::Null) => return Err(AppError::missing("fields")),
        Some(fields) => parse_account(Some(fields))?,
    };
    Ok(Json(connector.validate(&account).await?))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            message: "Not Found".to_string(),
            try_later: None,
        }),
    )
}
