//! Upload leg of a transfer
//!
//! Attaches the live download body to the upload request. The body is polled by
//! the upload client as it writes, so the download never runs ahead of what the
//! receiver accepts.

use log::debug;

use crate::core::client::{UploadClient, UploadRequest, UploadResponse};
use crate::core::error::{Error, Result};

/// Send the upload and check its status.
///
/// `download_status` is carried into the error so a rejected upload still reports
/// both legs.
pub async fn relay<C>(client: &C, request: UploadRequest, download_status: u16) -> Result<UploadResponse>
where
    C: UploadClient,
{
    let url = request.url.clone();
    let method = request.method;

    debug!("Relaying download body to {method} {url}");
    let response = client.send(request).await?;

    if !(200..300).contains(&response.status) {
        return Err(Error::UploadFailed {
            status: response.status,
            url,
            method,
            download_status: Some(download_status),
        });
    }

    debug!("Upload to {url} finished with HTTP {}", response.status);
    Ok(response)
}
