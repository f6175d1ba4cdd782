//! Transfer engine for stream-relay
//!
//! Runs one item through `validate → download → upload → result`. The download
//! body goes straight into the upload request; memory use stays at the size of
//! the transport buffers whatever the file size.

use log::{debug, info};

use crate::core::client::{DownloadClient, ReqwestTransport, UploadClient, UploadRequest};
use crate::core::config::TransportConfig;
use crate::core::download;
use crate::core::error::Result;
use crate::core::headers::resolve_headers;
use crate::core::request::TransferRequest;
use crate::core::result::{self, Completed, TransferResult};
use crate::core::stream::TransferOptions;
use crate::core::upload;

/// Relays files from a download client into an upload client
pub struct TransferEngine<D, U> {
    download: D,
    upload: U,
    options: TransferOptions,
}

impl TransferEngine<ReqwestTransport, ReqwestTransport> {
    /// Create an engine over reqwest with the default transport configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&TransportConfig::default())
    }

    /// Create an engine over reqwest with a custom transport configuration
    pub fn with_config(config: &TransportConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_clients(transport.clone(), transport))
    }
}

impl<D, U> TransferEngine<D, U>
where
    D: DownloadClient,
    U: UploadClient,
{
    /// Create an engine from explicit clients for each leg
    pub fn with_clients(download: D, upload: U) -> Self {
        Self {
            download,
            upload,
            options: TransferOptions::default(),
        }
    }

    /// Replace the transfer options
    pub fn with_options(mut self, options: TransferOptions) -> Self {
        self.options = options;
        self
    }

    /// Transfer one item.
    ///
    /// Empty URLs are always an error. Any later failure is raised or returned as
    /// an error record depending on `request.throw_on_error`.
    pub async fn execute(&self, request: &TransferRequest) -> Result<TransferResult> {
        request.validate()?;

        let outcome = self.run(request).await;
        if let Ok(completed) = &outcome {
            info!(
                "Transferred {} -> {} (HTTP {} / {})",
                request.download_url,
                request.upload_url,
                completed.download_status,
                completed.upload_status
            );
        }
        result::finish(request, outcome)
    }

    async fn run(&self, request: &TransferRequest) -> Result<Completed> {
        let mut headers = resolve_headers(request);

        debug!("Downloading {}", request.download_url);
        let downloaded = download::initiate(
            &self.download,
            &request.download_url,
            &mut headers,
            request.content_length,
        )
        .await?;

        let body = match &self.options.progress {
            Some(progress) => downloaded
                .body
                .with_progress(downloaded.content_length.unwrap_or(0), progress.clone()),
            None => downloaded.body,
        };

        debug!("Uploading to {} with {}", request.upload_url, request.method);
        let upload_request = UploadRequest {
            url: request.upload_url.clone(),
            method: request.method,
            headers: headers.upload,
            body,
        };
        let response = upload::relay(&self.upload, upload_request, downloaded.status).await?;

        Ok(Completed {
            download_status: downloaded.status,
            upload_status: response.status,
            upload_body: response.body,
        })
    }
}
