//! Download leg of a transfer
//!
//! Opens the GET, checks the status before a single body byte is read, and
//! hands back the live response body.

use log::debug;

use crate::core::client::DownloadClient;
use crate::core::error::{Error, Result};
use crate::core::headers::{Headers, ResolvedHeaders};
use crate::core::request::parse_leading_integer;
use crate::core::stream::RelayStream;

/// A validated download whose body has not been touched yet
#[derive(Debug)]
pub struct DownloadOutcome {
    pub status: u16,
    pub headers: Headers,
    /// Effective size: the requested length, else the response `content-length`
    pub content_length: Option<u64>,
    pub body: RelayStream,
}

/// Start the download and validate its status.
///
/// On a non-2xx status the body is dropped right away so the connection is
/// released before the error is returned. On success the effective content
/// length is propagated to the upload headers unless one is already set there.
pub async fn initiate<C>(
    client: &C,
    url: &str,
    headers: &mut ResolvedHeaders,
    requested_length: Option<u64>,
) -> Result<DownloadOutcome>
where
    C: DownloadClient,
{
    let response = client.get(url, &headers.download).await?;
    let status = response.status;

    if !(200..300).contains(&status) {
        drop(response.body);
        debug!("Download of {url} rejected with HTTP {status}, body discarded");
        return Err(Error::DownloadFailed {
            status,
            url: url.to_string(),
        });
    }

    let content_length = requested_length.filter(|length| *length > 0).or_else(|| {
        response
            .header("content-length")
            .and_then(parse_leading_integer)
            .filter(|length| *length > 0)
    });

    if let Some(length) = content_length {
        if headers.set_upload_content_length_if_absent(length) {
            debug!("Upload Content-Length set to {length} from download");
        }
    }

    debug!("Download of {url} started with HTTP {status}, content length {content_length:?}");
    Ok(DownloadOutcome {
        status,
        headers: response.headers,
        content_length,
        body: response.body,
    })
}
