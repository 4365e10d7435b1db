use crate::api::{DriveApi, GoogleDriveClient};
use crate::config::{GoogleOAuthConfig, SyncSettings, BASE_URL};
use crate::synchronizer::config::DRIVE_IDS_FILTER;
use crate::synchronizer::schema::schemas;
use crate::{datalist, descriptor, resource, synchronizer};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use sync_connector::descriptor::ConnectorDescriptor;
use sync_connector::synchronizer::{Datalist, SynchronizerConfig, TypeSchema};
use sync_connector::{
    AppError, ConcurrencyLimiter, Connector, DataQuery, ResourceStream, Result, SynchronizerData,
    ValidatedAccount,
};

const LOGO: &str = include_str!("../assets/logo.svg");

/// OAuth credentials of a connected Google account.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveAccount {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
}

/// Creates the Drive API handle for an account.
pub trait DriveApiFactory: Send + Sync + 'static {
    fn create(&self, account: &DriveAccount) -> Arc<dyn DriveApi>;
}

/// Builds [`GoogleDriveClient`]s sharing one HTTP connection pool and one
/// concurrency limiter.
pub struct GoogleApiFactory {
    http_client: Client,
    base_url: String,
    limiter: ConcurrencyLimiter,
}

impl GoogleApiFactory {
    pub fn new(http_client: Client, limiter: ConcurrencyLimiter) -> Self {
        Self::with_base_url(http_client, BASE_URL.to_string(), limiter)
    }

    pub fn with_base_url(http_client: Client, base_url: String, limiter: ConcurrencyLimiter) -> Self {
        Self {
            http_client,
            base_url,
            limiter,
        }
    }
}

impl DriveApiFactory for GoogleApiFactory {
    fn create(&self, account: &DriveAccount) -> Arc<dyn DriveApi> {
        Arc::new(GoogleDriveClient::with_base_url(
            self.http_client.clone(),
            account.access_token.clone(),
            self.base_url.clone(),
            self.limiter.clone(),
        ))
    }
}

pub struct GoogleDriveConnector {
    apis: Arc<dyn DriveApiFactory>,
    settings: SyncSettings,
    oauth: GoogleOAuthConfig,
    api_version: u32,
    http_client: Client,
}

impl GoogleDriveConnector {
    pub fn new(
        apis: Arc<dyn DriveApiFactory>,
        settings: SyncSettings,
        oauth: GoogleOAuthConfig,
        api_version: u32,
        http_client: Client,
    ) -> Self {
        Self {
            apis,
            settings,
            oauth,
            api_version,
            http_client,
        }
    }

    /// Wire the production connector: Google endpoints, one limiter of
    /// `max_concurrent_connections` slots.
    pub fn from_settings(
        settings: SyncSettings,
        oauth: GoogleOAuthConfig,
        api_version: u32,
        max_concurrent_connections: usize,
    ) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        let limiter = ConcurrencyLimiter::new(max_concurrent_connections);
        let apis = Arc::new(GoogleApiFactory::new(http_client.clone(), limiter));
        Ok(Self::new(apis, settings, oauth, api_version, http_client))
    }

    pub fn api(&self, account: &DriveAccount) -> Arc<dyn DriveApi> {
        self.apis.create(account)
    }

    pub fn oauth(&self) -> &GoogleOAuthConfig {
        &self.oauth
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }
}

#[async_trait]
impl Connector for GoogleDriveConnector {
    type Account = DriveAccount;

    fn descriptor(&self) -> ConnectorDescriptor {
        descriptor::descriptor()
    }

    fn logo(&self) -> &'static str {
        LOGO
    }

    async fn validate(&self, account: &DriveAccount) -> Result<ValidatedAccount> {
        let user = self.api(account).get_current_user().await?;
        let name = user
            .display_name
            .filter(|n| !n.is_empty())
            .or(user.email_address)
            .unwrap_or_else(|| "Google Drive".to_string());
        Ok(ValidatedAccount { name })
    }

    fn synchronizer_config(&self) -> SynchronizerConfig {
        synchronizer::config::synchronizer_config(self.api_version)
    }

    async fn schema(
        &self,
        types: &[String],
        _account: Option<&DriveAccount>,
    ) -> Result<BTreeMap<String, TypeSchema>> {
        Ok(schemas(types))
    }

    async fn datalist(&self, account: &DriveAccount, field: &str) -> Result<Datalist> {
        if field != DRIVE_IDS_FILTER {
            return Err(AppError::validation(format!(
                "Unknown datalist field: {}",
                field
            )));
        }
        datalist::drive_options(self.api(account).as_ref()).await
    }

    async fn fetch_data(
        &self,
        query: DataQuery<DriveAccount>,
    ) -> Result<SynchronizerData<Value, Value>> {
        let api = self.api(&query.account);
        synchronizer::fetch_data(api.as_ref(), &self.settings, &query).await
    }

    async fn stream_resource(
        &self,
        account: &DriveAccount,
        params: &Value,
    ) -> Result<ResourceStream> {
        resource::stream_file(self.api(account).as_ref(), params).await
    }
}
