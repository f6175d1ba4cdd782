//! HTTP capabilities used by the transfer engine
//!
//! The engine never talks to reqwest directly. It is handed a [`DownloadClient`]
//! and an [`UploadClient`], so tests can plug in fakes and the production build
//! uses [`ReqwestTransport`] for both legs.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, Url};

use crate::core::config::TransportConfig;
use crate::core::error::{Error, Result};
use crate::core::headers::Headers;
use crate::core::request::Method;
use crate::core::stream::RelayStream;

/// Response of the download leg: status and headers known, body not yet read
#[derive(Debug)]
pub struct DownloadResponse {
    pub status: u16,
    /// Response headers with lowercase names
    pub headers: Headers,
    pub body: RelayStream,
}

impl DownloadResponse {
    /// Value of a response header, looked up case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Outbound upload with a live body
#[derive(Debug)]
pub struct UploadRequest {
    pub url: String,
    pub method: Method,
    pub headers: Headers,
    pub body: RelayStream,
}

/// Completed upload response, body fully read (it is the receiver's reply, not the file)
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

/// Low-level client for the download leg.
///
/// Must resolve as soon as response headers arrive and expose the body as a live
/// stream. Dropping the returned body aborts the response.
pub trait DownloadClient: Send + Sync {
    fn get(
        &self,
        url: &str,
        headers: &Headers,
    ) -> impl Future<Output = Result<DownloadResponse>> + Send;
}

/// Streaming-capable client for the upload leg.
///
/// Must forward the request body incrementally as it is polled, never collecting it.
pub trait UploadClient: Send + Sync {
    fn send(&self, request: UploadRequest) -> impl Future<Output = Result<UploadResponse>> + Send;
}

/// Production transport backed by reqwest, used for both legs
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport from configuration
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .tcp_keepalive(Duration::from_secs(60))
            .pool_idle_timeout(config.pool_idle_timeout)
            .user_agent(config.user_agent.clone())
            // A 3xx is reported to the caller, never followed
            .redirect(Policy::none());

        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transfer(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl DownloadClient for ReqwestTransport {
    async fn get(&self, url: &str, headers: &Headers) -> Result<DownloadResponse> {
        let url = Url::parse(url)
            .map_err(|e| Error::DownloadRequestFailed(format!("Invalid URL '{url}': {e}")))?;
        let header_map = to_header_map(headers).map_err(Error::DownloadRequestFailed)?;

        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .headers(header_map)
            .send()
            .await
            .map_err(|e| Error::DownloadRequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = from_header_map(response.headers());
        Ok(DownloadResponse {
            status,
            headers,
            body: RelayStream::from_response(response),
        })
    }
}

impl UploadClient for ReqwestTransport {
    async fn send(&self, request: UploadRequest) -> Result<UploadResponse> {
        let url = Url::parse(&request.url)
            .map_err(|e| Error::Transfer(format!("Invalid URL '{}': {e}", request.url)))?;
        let header_map = to_header_map(&request.headers).map_err(Error::Transfer)?;

        debug!("{} {url} (streaming body)", request.method);
        let response = self
            .client
            .request(request.method.into(), url)
            .headers(header_map)
            .body(reqwest::Body::wrap_stream(request.body))
            .send()
            .await
            .map_err(|e| Error::Transfer(format!("Upload request failed: {e}")))?;

        let status = response.status().as_u16();
        let headers = from_header_map(response.headers());
        let body = response.bytes().await?;
        Ok(UploadResponse {
            status,
            headers,
            body,
        })
    }
}

fn to_header_map(headers: &Headers) -> std::result::Result<HeaderMap, String> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| format!("Invalid header name '{name}': {e}"))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| format!("Invalid value for header '{name}': {e}"))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn from_header_map(map: &HeaderMap) -> Headers {
    map.iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}
