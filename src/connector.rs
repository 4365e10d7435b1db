use crate::descriptor::ConnectorDescriptor;
use crate::error::{AppError, Result};
use crate::synchronizer::{Datalist, DataQuery, SynchronizerConfig, SynchronizerData, TypeSchema};
use async_trait::async_trait;
use axum::body::Body;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Reply to `POST /validate`: the display name of the connected account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedAccount {
    pub name: String,
}

/// Binary content handed back by `POST /api/v1/synchronizer/resource`.
pub struct ResourceStream {
    pub filename: String,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: Body,
}

/// A data-synchronization connector.
///
/// Connectors are stateless between calls: everything needed to resume a
/// synchronization lives in the cursor the platform echoes back. The
/// generic router in [`crate::api`] handles request validation, logging and
/// error rendering, so implementations only deal with typed inputs.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Credentials as sent by the platform in `account` / `fields`.
    type Account: DeserializeOwned + Send + Sync;

    fn descriptor(&self) -> ConnectorDescriptor;

    /// SVG served on `GET /logo`.
    fn logo(&self) -> &'static str;

    /// Check the credentials against the vendor.
    async fn validate(&self, account: &Self::Account) -> Result<ValidatedAccount>;

    fn synchronizer_config(&self) -> SynchronizerConfig;

    /// Schemas for the requested types. Unknown types are skipped.
    async fn schema(
        &self,
        types: &[String],
        account: Option<&Self::Account>,
    ) -> Result<BTreeMap<String, TypeSchema>>;

    /// Options for a filter field marked as `datalist`.
    async fn datalist(&self, account: &Self::Account, field: &str) -> Result<Datalist> {
        let _ = account;
        Err(AppError::validation(format!("Unknown datalist field: {}", field)))
    }

    /// Fetch one page of `query.requested_type`.
    async fn fetch_data(&self, query: DataQuery<Self::Account>)
        -> Result<SynchronizerData<Value, Value>>;

    /// Stream a binary resource (PDF, file content).
    async fn stream_resource(&self, account: &Self::Account, params: &Value) -> Result<ResourceStream> {
        let _ = (account, params);
        Err(AppError::validation("Resources are not supported"))
    }
}
