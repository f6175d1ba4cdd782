//! # stream-relay Library
//!
//! Streams a file from a download URL straight into an upload request to a
//! second URL. The file is never held in memory: the download body is attached
//! to the upload as a live stream, so memory use stays at the size of the
//! transport buffers regardless of file size.
//!
//! ## Features
//!
//! - **Streaming relay**: download and upload progress together under backpressure
//! - **Header resolution**: JSON or structured header parameters merged over defaults
//! - **Bearer promotion**: `?bearer=TOKEN` on the upload URL becomes an `Authorization` header
//! - **Content length propagation**: explicit length, else the download's `content-length`
//! - **Structured failures**: raise, or return an error record carrying both statuses
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let result = stream_relay::transfer(
//!         "https://example.com/file.zip",
//!         "https://upload.example.com/upload?bearer=TOKEN",
//!     )
//!     .await?;
//!     println!("uploaded with HTTP {:?}", result.upload_status);
//!     Ok(())
//! }
//! ```
//!
//! ## Full Control
//!
//! ```rust,no_run
//! use stream_relay::{Method, TransferEngine, TransferRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut request = TransferRequest::new("https://example.com/file.zip", "https://upload.example.com/put");
//!     request.method = Method::Put;
//!     request.upload_headers = r#"{"X-Api-Key": "secret"}"#.into();
//!     request.throw_on_error = false;
//!
//!     let engine = TransferEngine::new()?;
//!     let result = engine.execute(&request).await?;
//!     if !result.success {
//!         eprintln!("transfer failed: {:?}", result.error);
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub use crate::core::client::{
    DownloadClient, DownloadResponse, ReqwestTransport, UploadClient, UploadRequest,
    UploadResponse,
};
pub use crate::core::config::TransportConfig;
pub use crate::core::download::DownloadOutcome;
pub use crate::core::error::{Error, Result};
pub use crate::core::headers::{
    extract_bearer_token, parse_headers, resolve_headers, Headers, ResolvedHeaders,
};
pub use crate::core::node::{execute_items, ItemOutput, ItemPayload, NodeParameters, PairedItem};
pub use crate::core::request::{HeaderInput, Method, TransferRequest};
pub use crate::core::result::TransferResult;
pub use crate::core::stream::{ProgressCallback, RelayStream, TransferOptions};
pub use crate::core::TransferEngine;

// Internal modules
mod core;

/// Relay a file with default settings: POST, no extra headers, raise on failure
///
/// # Arguments
/// * `download_url` - Where the file is fetched from
/// * `upload_url` - Where the file is sent; a `bearer` query parameter becomes an Authorization header
pub async fn transfer(download_url: &str, upload_url: &str) -> Result<TransferResult> {
    let engine = TransferEngine::new()?;
    engine
        .execute(&TransferRequest::new(download_url, upload_url))
        .await
}

/// Relay a file described by a full request
pub async fn transfer_request(request: &TransferRequest) -> Result<TransferResult> {
    let engine = TransferEngine::new()?;
    engine.execute(request).await
}

/// Relay a file with progress tracking
///
/// The callback receives (relayed_bytes, total_bytes); total is 0 when the size is unknown.
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let request = stream_relay::TransferRequest::new("https://d.example/big.iso", "https://u.example/in");
/// stream_relay::transfer_with_progress(&request, |relayed, total| {
///     println!("{relayed}/{total} bytes");
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn transfer_with_progress<F>(request: &TransferRequest, progress: F) -> Result<TransferResult>
where
    F: Fn(u64, u64) + Send + Sync + 'static,
{
    let engine = TransferEngine::new()?.with_options(TransferOptions {
        progress: Some(Arc::new(progress)),
    });
    engine.execute(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transfer_rejects_empty_urls_before_any_request() {
        let err = transfer("", "https://u/upload").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Download URL is required and cannot be empty");

        let err = transfer("https://d/file.zip", " ").await.unwrap_err();
        assert_eq!(err.to_string(), "Upload URL is required and cannot be empty");
    }
}
