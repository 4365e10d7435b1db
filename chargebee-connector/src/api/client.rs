use super::{Download, ListPage, ListRequest};
use crate::config::site_base_url;
use anyhow::Context;
use futures::TryStreamExt;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use sync_connector::{AppError, ConcurrencyLimiter, Result};
use tracing::{debug, warn};

/// HTTP client for one Chargebee site.
///
/// Authenticates with HTTP basic auth, the API key as user name and an
/// empty password. Requests wait for a slot in the shared limiter.
pub struct ChargebeeClient {
    api_key: String,
    http_client: Client,
    base_url: String,
    limiter: ConcurrencyLimiter,
}

impl ChargebeeClient {
    pub fn new(http_client: Client, site: &str, api_key: String, limiter: ConcurrencyLimiter) -> Self {
        Self::with_base_url(http_client, api_key, site_base_url(site), limiter)
    }

    /// Create a client with a custom base URL (for testing with a mock server).
    pub fn with_base_url(
        http_client: Client,
        api_key: String,
        base_url: String,
        limiter: ConcurrencyLimiter,
    ) -> Self {
        Self {
            api_key,
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.api_key, None::<&str>)
    }

    /// Send through the limiter. The slot is released once the headers
    /// arrive, so the body must be streamed or ignored.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        self.send_with(request, |response| async move { Ok(response) })
            .await
    }

    /// Send through the limiter and run `read` on the body before the slot
    /// is released.
    async fn send_with<T, F, Fut>(&self, request: RequestBuilder, read: F) -> Result<T>
    where
        F: FnOnce(Response) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.limiter
            .run(async {
                let response = request.send().await.map_err(transport_error)?;
                read(check_response(response).await?).await
            })
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        self.send_with(request, |response| async move {
            let parsed = response
                .json::<T>()
                .await
                .with_context(|| format!("Failed to parse {} response", what))?;
            Ok(parsed)
        })
        .await
    }

    /// `GET /{resource}`: one page of a list endpoint.
    pub async fn list(&self, resource: &str, request: &ListRequest) -> Result<ListPage> {
        debug!(resource, offset = ?request.offset, filters = ?request.filters, "list");
        let url = format!("{}/{}", self.base_url, resource);
        let builder = self.authorized(self.http_client.get(url)).query(&request.query());
        self.get_json(builder, resource).await
    }

    /// `POST /{resource}/{id}/pdf`: a short-lived download URL.
    pub async fn pdf_url(&self, resource: &str, id: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct PdfResponse {
            download: PdfDownload,
        }

        #[derive(Deserialize)]
        struct PdfDownload {
            download_url: String,
        }

        let url = format!(
            "{}/{}/{}/pdf",
            self.base_url,
            resource,
            urlencoding::encode(id)
        );
        let response: PdfResponse = self
            .get_json(self.authorized(self.http_client.post(url)), "pdf")
            .await?;
        Ok(response.download.download_url)
    }

    /// Open a download URL handed out by [`Self::pdf_url`]. These URLs are
    /// pre-signed, so no credentials are sent.
    pub async fn download(&self, url: &str) -> Result<Download> {
        let response = self.send(self.http_client.get(url)).await?;
        let content_length = response.content_length();
        let body = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        Ok(Download {
            content_length,
            body: Box::pin(body),
        })
    }
}

/// Chargebee error body: `{"message", "api_error_code", "http_status_code", ..}`
#[derive(Deserialize, Default)]
struct ErrorBody {
    message: Option<String>,
    http_status_code: Option<u16>,
}

async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let error = vendor_error(status.as_u16(), &body);
    warn!(status = status.as_u16(), "Chargebee API error: {}", error);
    Err(error)
}

/// Map a failed response to a vendor error. Only rate limiting is
/// retryable.
pub(crate) fn vendor_error(http_status: u16, body: &str) -> AppError {
    let detail = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();
    let status = detail.http_status_code.unwrap_or(http_status);
    let message = detail
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "Chargebee API error".to_string());
    AppError::vendor(status, message, status == 429)
}

fn transport_error(error: reqwest::Error) -> AppError {
    let status = error.status().map(|s| s.as_u16()).unwrap_or(500);
    AppError::vendor(status, error.to_string(), status == 429)
}
