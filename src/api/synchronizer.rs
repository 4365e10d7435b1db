use super::{parse_account, ApiJson};
use crate::connector::{Connector, ResourceStream};
use crate::error::{AppError, Result};
use crate::synchronizer::{
    Datalist, DataQuery, DataRequest, SynchronizerConfig, SynchronizerData, TypeSchema,
};
use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub(super) fn routes<C: Connector>() -> Router<Arc<C>> {
    Router::new()
        .route("/api/v1/synchronizer/config", post(config::<C>))
        .route("/api/v1/synchronizer/schema", post(schema::<C>))
        .route("/api/v1/synchronizer/filter/validate", post(validate_filter))
        .route("/api/v1/synchronizer/datalist", post(datalist::<C>))
        .route("/api/v1/synchronizer/data", post(data::<C>))
        .route("/api/v1/synchronizer/resource", post(resource::<C>))
}

/// POST /api/v1/synchronizer/config
async fn config<C: Connector>(State(connector): State<Arc<C>>) -> Json<SynchronizerConfig> {
    Json(connector.synchronizer_config())
}

#[derive(Deserialize)]
struct SchemaRequest {
    types: Option<Vec<String>>,
    account: Option<Value>,
}

/// POST /api/v1/synchronizer/schema
async fn schema<C: Connector>(
    State(connector): State<Arc<C>>,
    ApiJson(body): ApiJson<SchemaRequest>,
) -> Result<Json<BTreeMap<String, TypeSchema>>> {
    let types = body
        .types
        .ok_or_else(|| AppError::validation("\"types\" are missing"))?;
    let account: Option<C::Account> = match body.account {
        None | Some(Value::Null) => None,
        account => Some(parse_account(account)?),
    };
    Ok(Json(connector.schema(&types, account.as_ref()).await?))
}

/// POST /api/v1/synchronizer/filter/validate - Nothing to check yet
async fn validate_filter() -> Json<Value> {
    Json(serde_json::json!({}))
}

#[derive(Deserialize)]
struct DatalistRequest {
    account: Option<Value>,
    field: Option<String>,
}

/// POST /api/v1/synchronizer/datalist
async fn datalist<C: Connector>(
    State(connector): State<Arc<C>>,
    ApiJson(body): ApiJson<DatalistRequest>,
) -> Result<Json<Datalist>> {
    let account: C::Account = parse_account(body.account)?;
    let field = body
        .field
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::missing("field"))?;
    Ok(Json(connector.datalist(&account, &field).await?))
}

/// POST /api/v1/synchronizer/data - One page of one entity type
async fn data<C: Connector>(
    State(connector): State<Arc<C>>,
    ApiJson(body): ApiJson<DataRequest>,
) -> Result<Json<SynchronizerData<Value, Value>>> {
    let requested_type = body.requested_type()?.to_string();
    let pagination = body.cursor().cloned();
    let account: C::Account = parse_account(body.account)?;

    let query = DataQuery {
        account,
        requested_type: requested_type.clone(),
        filter: body.filter,
        last_synchronized_at: body.last_synchronized_at,
        pagination,
        version: body.version,
    };

    let started = Instant::now();
    let result = connector.fetch_data(query).await?;

    info!(
        requested_type = %requested_type,
        items = result.items.len(),
        has_next = result.pagination.has_next,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Fetched synchronizer data"
    );

    Ok(Json(result))
}

#[derive(Deserialize)]
struct ResourceRequest {
    account: Option<Value>,
    params: Option<Value>,
}

/// POST /api/v1/synchronizer/resource - Stream a binary resource
async fn resource<C: Connector>(
    State(connector): State<Arc<C>>,
    ApiJson(body): ApiJson<ResourceRequest>,
) -> Result<Response> {
    let account: C::Account = parse_account(body.account)?;
    let params = body.params.unwrap_or(Value::Null);

    let started = Instant::now();
    let stream = connector.stream_resource(&account, &params).await?;
    info!(
        filename = %stream.filename,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Streaming resource"
    );

    Ok(stream_response(stream))
}

fn stream_response(stream: ResourceStream) -> Response {
    let mut response = stream.body.into_response();
    let headers = response.headers_mut();

    if let Ok(value) = HeaderValue::from_str(&content_disposition(&stream.filename)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if let Some(value) = stream
        .content_type
        .and_then(|ct| HeaderValue::from_str(&ct).ok())
    {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Some(length) = stream.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }
    response
}

/// Header values must be visible ASCII, so other names go through RFC 5987.
fn content_disposition(filename: &str) -> String {
    let plain = filename.replace('"', "");
    if plain.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        format!("attachment; filename=\"{}\"", plain)
    } else {
        format!(
            "attachment; filename*=UTF-8''{}",
            urlencoding::encode(filename)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("invoice-42.pdf"),
            "attachment; filename=\"invoice-42.pdf\""
        );
    }

    #[test]
    fn test_content_disposition_non_ascii() {
        assert_eq!(
            content_disposition("résumé.pdf"),
            "attachment; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"
        );
    }
}
