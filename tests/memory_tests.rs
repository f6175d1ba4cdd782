//! Memory behaviour of the relay
//!
//! A counting allocator tracks live heap bytes while a 50 MB body flows from a
//! generated download into a draining upload, both in-process clients. Peak
//! growth must stay far below the file size. The reqwest path is measured in
//! `http_memory_tests.rs`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::stream;
use stream_relay::{
    DownloadClient, DownloadResponse, Headers, RelayStream, Result, TransferEngine,
    TransferRequest, UploadClient, UploadRequest, UploadResponse,
};

mod common;

use common::{CountingAllocator, FILE_SIZE, PEAK_LIMIT};

#[global_allocator]
static ALLOCATOR: CountingAllocator = CountingAllocator;

const CHUNK_SIZE: usize = 256 * 1024;

/// Download that produces `FILE_SIZE` bytes on demand, one chunk at a time
struct GeneratedDownload;

impl DownloadClient for GeneratedDownload {
    async fn get(&self, _url: &str, _headers: &Headers) -> Result<DownloadResponse> {
        let body = stream::unfold(0u64, |sent| async move {
            if sent >= FILE_SIZE {
                return None;
            }
            let len = CHUNK_SIZE.min((FILE_SIZE - sent) as usize);
            Some((Ok(Bytes::from(vec![0x5a; len])), sent + len as u64))
        });

        let mut headers = Headers::new();
        headers.insert("content-length".to_string(), FILE_SIZE.to_string());
        Ok(DownloadResponse {
            status: 200,
            headers,
            body: RelayStream::new(body),
        })
    }
}

/// Upload that reads the body through and throws it away
#[derive(Default)]
struct DrainingUpload {
    received: Arc<AtomicU64>,
    content_length: Arc<Mutex<Option<String>>>,
}

impl UploadClient for DrainingUpload {
    async fn send(&self, request: UploadRequest) -> Result<UploadResponse> {
        if let Ok(mut length) = self.content_length.lock() {
            *length = request.headers.get("Content-Length").cloned();
        }

        let mut reader = request.body.into_async_read();
        let copied = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
        self.received.store(copied, Ordering::SeqCst);

        Ok(UploadResponse {
            status: 200,
            headers: Headers::new(),
            body: Bytes::from_static(b"{\"ok\":true}"),
        })
    }
}

#[tokio::test]
async fn test_large_transfer_stays_within_memory_bound() {
    let upload = DrainingUpload::default();
    let received = Arc::clone(&upload.received);
    let content_length = Arc::clone(&upload.content_length);
    let engine = TransferEngine::with_clients(GeneratedDownload, upload);
    let request = TransferRequest::new("https://d.example/big.bin", "https://u.example/in");

    let baseline = common::start_measuring();
    let result = engine.execute(&request).await.unwrap();
    let growth = common::peak_growth(baseline);

    assert!(result.success);
    assert_eq!(received.load(Ordering::SeqCst), FILE_SIZE);
    assert_eq!(
        content_length.lock().unwrap().as_deref(),
        Some(FILE_SIZE.to_string().as_str())
    );
    assert!(
        growth < PEAK_LIMIT,
        "peak heap growth {growth} bytes while relaying {FILE_SIZE} bytes"
    );
}
