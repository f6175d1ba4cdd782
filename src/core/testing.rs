//! In-memory HTTP clients for unit tests

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::core::client::{
    DownloadClient, DownloadResponse, UploadClient, UploadRequest, UploadResponse,
};
use crate::core::error::{Error, Result};
use crate::core::headers::Headers;
use crate::core::request::Method;
use crate::core::stream::RelayStream;

/// Stream that flags when it gets dropped
struct DropFlagged<S> {
    inner: S,
    dropped: Arc<AtomicBool>,
}

impl<S: Stream + Unpin> Stream for DropFlagged<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl<S> Drop for DropFlagged<S> {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

pub fn body_of(parts: &[&'static [u8]]) -> Vec<io::Result<Bytes>> {
    parts.iter().map(|p| Ok(Bytes::from_static(p))).collect()
}

/// Download leg answering once with a fixed status, headers and body
pub struct FakeDownload {
    status: u16,
    headers: Headers,
    body: Mutex<Option<Vec<io::Result<Bytes>>>>,
    failure: Option<String>,
    pub calls: AtomicUsize,
    pub seen_headers: Mutex<Option<Headers>>,
    pub body_dropped: Arc<AtomicBool>,
}

impl FakeDownload {
    pub fn new(status: u16, headers: &[(&str, &str)], body: Vec<io::Result<Bytes>>) -> Self {
        Self {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: Mutex::new(Some(body)),
            failure: None,
            calls: AtomicUsize::new(0),
            seen_headers: Mutex::new(None),
            body_dropped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn ok(body: &[&'static [u8]]) -> Self {
        Self::new(200, &[], body_of(body))
    }

    /// Download whose request never gets a response
    pub fn unreachable(message: &str) -> Self {
        let mut fake = Self::new(0, &[], Vec::new());
        fake.failure = Some(message.to_string());
        fake
    }
}

impl DownloadClient for FakeDownload {
    async fn get(&self, _url: &str, headers: &Headers) -> Result<DownloadResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_headers.lock().unwrap() = Some(headers.clone());

        if let Some(message) = &self.failure {
            return Err(Error::DownloadRequestFailed(message.clone()));
        }

        let chunks = self
            .body
            .lock()
            .unwrap()
            .take()
            .expect("fake download body already consumed");
        let body = DropFlagged {
            inner: futures::stream::iter(chunks),
            dropped: Arc::clone(&self.body_dropped),
        };
        Ok(DownloadResponse {
            status: self.status,
            headers: self.headers.clone(),
            body: RelayStream::new(body),
        })
    }
}

/// What the fake upload endpoint received
#[derive(Debug, Clone, Default)]
pub struct ReceivedUpload {
    pub url: String,
    pub method: Option<Method>,
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// Upload leg that drains the body and answers with a fixed status and reply
pub struct FakeUpload {
    status: u16,
    reply: Bytes,
    pub calls: AtomicUsize,
    pub received: Mutex<Option<ReceivedUpload>>,
}

impl FakeUpload {
    pub fn new(status: u16, reply: &'static str) -> Self {
        Self {
            status,
            reply: Bytes::from_static(reply.as_bytes()),
            calls: AtomicUsize::new(0),
            received: Mutex::new(None),
        }
    }

    pub fn received(&self) -> ReceivedUpload {
        self.received.lock().unwrap().clone().unwrap_or_default()
    }
}

impl UploadClient for FakeUpload {
    async fn send(&self, request: UploadRequest) -> Result<UploadResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut body = Vec::new();
        let mut stream = request.body;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Transfer(format!("Upload body failed: {e}")))?;
            body.extend_from_slice(&chunk);
        }

        *self.received.lock().unwrap() = Some(ReceivedUpload {
            url: request.url,
            method: Some(request.method),
            headers: request.headers,
            body,
        });

        Ok(UploadResponse {
            status: self.status,
            headers: Headers::new(),
            body: self.reply.clone(),
        })
    }
}
