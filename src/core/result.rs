//! Per-item transfer results
//!
//! Converts the outcome of a transfer into the record handed back to the host,
//! or into a raised error when the request asks for it.

use bytes::Bytes;
use log::warn;
use serde::Serialize;
use serde_json::Value;

use crate::core::error::{Error, Result};
use crate::core::request::TransferRequest;

/// Record returned to the host for one item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,
}

/// Both legs finished with a 2xx status
#[derive(Debug, Clone)]
pub struct Completed {
    pub download_status: u16,
    pub upload_status: u16,
    pub upload_body: Bytes,
}

impl TransferResult {
    pub fn succeeded(completed: &Completed) -> Self {
        Self {
            success: true,
            download_status: Some(completed.download_status),
            upload_status: Some(completed.upload_status),
            upload_response: Some(interpret_upload_body(&completed.upload_body)),
            error: None,
            download_url: None,
            upload_url: None,
        }
    }

    /// Error record for a failure that is not raised
    pub fn failed(error: &Error, request: &TransferRequest) -> Self {
        let message = match error {
            // Rejected uploads keep their own message, it already names the URL and method
            Error::UploadFailed { .. } => error.to_string(),
            _ => error.url_context_message(&request.download_url, &request.upload_url),
        };

        Self {
            success: false,
            download_status: error.download_status(),
            upload_status: error.upload_status(),
            upload_response: None,
            error: Some(message),
            download_url: Some(request.download_url.clone()),
            upload_url: Some(request.upload_url.clone()),
        }
    }
}

/// Parse the upload reply as JSON when possible, otherwise keep it as text
pub fn interpret_upload_body(body: &Bytes) -> Value {
    match std::str::from_utf8(body) {
        Ok(text) => serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())),
        Err(_) => Value::String(String::from_utf8_lossy(body).into_owned()),
    }
}

/// Turn the pipeline outcome into the host-facing result.
///
/// Validation errors are always raised. Other failures are raised with URL
/// context when `throw_on_error` is set, and returned as error records otherwise.
pub fn finish(request: &TransferRequest, outcome: Result<Completed>) -> Result<TransferResult> {
    match outcome {
        Ok(completed) => Ok(TransferResult::succeeded(&completed)),
        Err(error) if error.is_validation() => Err(error),
        Err(error) if request.throw_on_error => {
            Err(error.with_url_context(&request.download_url, &request.upload_url))
        }
        Err(error) => {
            warn!("Transfer failed, returning error record: {error}");
            Ok(TransferResult::failed(&error, request))
        }
    }
}
