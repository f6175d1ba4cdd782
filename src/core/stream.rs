//! Streaming body types for stream-relay
//!
//! A [`RelayStream`] is the single-pass byte sequence handed from the download
//! leg to the upload leg. It is never buffered as a whole.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use tokio::io::AsyncRead;

/// Boxed byte stream shared by every transport
pub type BodyStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Progress callback: (relayed bytes so far, total bytes or 0 when unknown)
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Live, single-consumption body of a download response
pub struct RelayStream {
    inner: BodyStream,
}

impl RelayStream {
    /// Wrap any byte stream
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Expose the body of a reqwest response without reading it
    pub fn from_response(response: reqwest::Response) -> Self {
        Self::new(response.bytes_stream().map_err(io::Error::other))
    }

    /// Report every chunk that passes through, without holding on to it
    pub fn with_progress(self, total: u64, progress: ProgressCallback) -> Self {
        let mut relayed = 0u64;
        Self::new(self.inner.inspect_ok(move |chunk| {
            relayed += chunk.len() as u64;
            progress(relayed, total);
        }))
    }

    /// Adapt the stream for `AsyncRead` consumers
    pub fn into_async_read(self) -> impl AsyncRead + Send + Unpin {
        tokio_util::io::StreamReader::new(self.inner)
    }
}

impl Stream for RelayStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for RelayStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayStream").finish_non_exhaustive()
    }
}

/// Options for transfer operations
#[derive(Clone, Default)]
pub struct TransferOptions {
    /// Optional progress callback for the relayed bytes
    pub progress: Option<ProgressCallback>,
}

impl fmt::Debug for TransferOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferOptions")
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
