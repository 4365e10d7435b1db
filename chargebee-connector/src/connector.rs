use crate::api::{ChargebeeClient, ListRequest};
use crate::synchronizer::providers::INVOICES;
use crate::synchronizer::schema::schemas;
use crate::validation::validate_site;
use crate::{descriptor, resource, synchronizer};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use sync_connector::descriptor::ConnectorDescriptor;
use sync_connector::synchronizer::{SynchronizerConfig, TypeSchema};
use sync_connector::{
    ConcurrencyLimiter, Connector, DataQuery, ResourceStream, Result, SynchronizerData,
    ValidatedAccount,
};
use tracing::info;

const LOGO: &str = include_str!("../assets/logo.svg");

/// Token credentials of a Chargebee site.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargebeeAccount {
    #[serde(default)]
    pub site: String,
    #[serde(rename = "apiKey", alias = "api_key")]
    pub api_key: String,
}

pub struct ChargebeeConnector {
    http_client: Client,
    limiter: ConcurrencyLimiter,
    /// Fixed API root for every site; mock server in tests
    base_url: Option<String>,
    page_size: u32,
    api_version: u32,
}

impl ChargebeeConnector {
    pub fn new(
        http_client: Client,
        limiter: ConcurrencyLimiter,
        page_size: u32,
        api_version: u32,
    ) -> Self {
        Self {
            http_client,
            limiter,
            base_url: None,
            page_size,
            api_version,
        }
    }

    /// Send every site's requests to `base_url` (for testing with a mock server).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Wire the production connector: one limiter of
    /// `max_concurrent_connections` slots shared by all accounts.
    pub fn from_settings(
        page_size: u32,
        api_version: u32,
        max_concurrent_connections: usize,
    ) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        let limiter = ConcurrencyLimiter::new(max_concurrent_connections);
        Ok(Self::new(http_client, limiter, page_size, api_version))
    }

    pub fn client(&self, account: &ChargebeeAccount) -> ChargebeeClient {
        let http_client = self.http_client.clone();
        let api_key = account.api_key.clone();
        let limiter = self.limiter.clone();
        match &self.base_url {
            Some(base_url) => {
                ChargebeeClient::with_base_url(http_client, api_key, base_url.clone(), limiter)
            }
            None => ChargebeeClient::new(http_client, account.site.trim(), api_key, limiter),
        }
    }
}

#[async_trait]
impl Connector for ChargebeeConnector {
    type Account = ChargebeeAccount;

    fn descriptor(&self) -> ConnectorDescriptor {
        descriptor::descriptor()
    }

    fn logo(&self) -> &'static str {
        LOGO
    }

    async fn validate(&self, account: &ChargebeeAccount) -> Result<ValidatedAccount> {
        let site = validate_site(&account.site)?;
        self.client(account)
            .list(INVOICES, &ListRequest::new(1, None))
            .await?;
        info!(site, "Account validated");
        Ok(ValidatedAccount {
            name: site.to_string(),
        })
    }

    fn synchronizer_config(&self) -> SynchronizerConfig {
        synchronizer::config::synchronizer_config(self.api_version)
    }

    async fn schema(
        &self,
        types: &[String],
        account: Option<&ChargebeeAccount>,
    ) -> Result<BTreeMap<String, TypeSchema>> {
        let client = account.map(|account| self.client(account));
        schemas(types, client.as_ref()).await
    }

    async fn fetch_data(
        &self,
        query: DataQuery<ChargebeeAccount>,
    ) -> Result<SynchronizerData<Value, Value>> {
        let client = self.client(&query.account);
        synchronizer::fetch_data(&client, query.account.site.trim(), self.page_size, &query).await
    }

    async fn stream_resource(
        &self,
        account: &ChargebeeAccount,
        params: &Value,
    ) -> Result<ResourceStream> {
        resource::stream_pdf(&self.client(account), params).await
    }
}
