//! Typed transfer requests
//!
//! The host hands over a loosely-typed parameter bag per item. It is mapped into a
//! [`TransferRequest`] once, at the boundary, so nothing downstream ever has to
//! inspect dynamic values again.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::core::error::{Error, Result};
use crate::core::node::NodeParameters;

/// HTTP method used for the upload leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            other => Err(Error::Validation(format!(
                "Unsupported HTTP method '{other}': expected POST or PUT"
            ))),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        }
    }
}

/// Raw header parameter as supplied by the host: JSON text or an already-parsed object
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderInput {
    Text(String),
    Structured(Map<String, Value>),
}

impl Default for HeaderInput {
    fn default() -> Self {
        HeaderInput::Text("{}".to_string())
    }
}

impl From<Value> for HeaderInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => HeaderInput::Text(text),
            Value::Object(map) => HeaderInput::Structured(map),
            // Anything else carries no headers
            _ => HeaderInput::Structured(Map::new()),
        }
    }
}

impl From<&str> for HeaderInput {
    fn from(text: &str) -> Self {
        HeaderInput::Text(text.to_string())
    }
}

/// Everything needed to relay one item, already typed
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub download_url: String,
    pub upload_url: String,
    pub method: Method,
    /// Explicit size of the file in bytes, always positive when set
    pub content_length: Option<u64>,
    pub download_headers: HeaderInput,
    pub upload_headers: HeaderInput,
    /// Raise on transfer failures instead of returning an error record
    pub throw_on_error: bool,
}

impl TransferRequest {
    /// Create a request with the host's defaults: POST, no extra headers, throw on error
    pub fn new(download_url: impl Into<String>, upload_url: impl Into<String>) -> Self {
        Self {
            download_url: download_url.into(),
            upload_url: upload_url.into(),
            method: Method::default(),
            content_length: None,
            download_headers: HeaderInput::default(),
            upload_headers: HeaderInput::default(),
            throw_on_error: true,
        }
    }

    /// Read and validate the parameters of one item from the host
    pub fn from_parameters<P>(params: &P, item_index: usize) -> Result<Self>
    where
        P: NodeParameters + ?Sized,
    {
        let download_url = params
            .get("downloadUrl", item_index)
            .map(value_to_string)
            .unwrap_or_default();
        let upload_url = params
            .get("uploadUrl", item_index)
            .map(value_to_string)
            .unwrap_or_default();

        let method = match params.get("method", item_index) {
            Some(Value::String(name)) => name.parse()?,
            Some(Value::Null) | None => Method::default(),
            Some(other) => {
                return Err(Error::Validation(format!(
                    "Unsupported HTTP method '{other}': expected POST or PUT"
                )))
            }
        };

        let content_length = params
            .get("contentLength", item_index)
            .and_then(|value| parse_content_length(&value));

        let download_headers = params
            .get("downloadHeaders", item_index)
            .map(HeaderInput::from)
            .unwrap_or_default();
        let upload_headers = params
            .get("uploadHeaders", item_index)
            .map(HeaderInput::from)
            .unwrap_or_default();

        let throw_on_error = params
            .get("throwOnError", item_index)
            .and_then(|value| value.as_bool())
            .unwrap_or(true);

        let request = Self {
            download_url,
            upload_url,
            method,
            content_length,
            download_headers,
            upload_headers,
            throw_on_error,
        };
        request.validate()?;
        Ok(request)
    }

    /// Reject requests whose URLs are empty or whitespace-only
    pub fn validate(&self) -> Result<()> {
        if self.download_url.trim().is_empty() {
            return Err(Error::Validation(
                "Download URL is required and cannot be empty".to_string(),
            ));
        }
        if self.upload_url.trim().is_empty() {
            return Err(Error::Validation(
                "Upload URL is required and cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Interpret a content length given as a number or a numeric string.
///
/// Strings are read up to the first non-digit (`"1024 bytes"` is 1024). Zero,
/// negative and unparseable values mean "unknown".
pub fn parse_content_length(value: &Value) -> Option<u64> {
    let length = match value {
        Value::Number(n) => match n.as_u64() {
            Some(length) => Some(length),
            None => n
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 1.0)
                .map(|f| f.trunc() as u64),
        },
        Value::String(s) => parse_leading_integer(s),
        _ => None,
    };
    length.filter(|length| *length > 0)
}

pub(crate) fn parse_leading_integer(text: &str) -> Option<u64> {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn bag(values: Value) -> HashMap<String, Value> {
        values
            .as_object()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("POST".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("put".parse::<Method>().unwrap(), Method::Put);
        assert!("PATCH".parse::<Method>().is_err());
        assert_eq!(Method::Put.to_string(), "PUT");
    }

    #[test]
    fn test_parse_content_length() {
        assert_eq!(parse_content_length(&json!(1024)), Some(1024));
        assert_eq!(parse_content_length(&json!("2048")), Some(2048));
        assert_eq!(parse_content_length(&json!("  512 bytes")), Some(512));
        assert_eq!(parse_content_length(&json!(12.9)), Some(12));
        assert_eq!(parse_content_length(&json!("")), None);
        assert_eq!(parse_content_length(&json!("abc")), None);
        assert_eq!(parse_content_length(&json!(0)), None);
        assert_eq!(parse_content_length(&json!(-5)), None);
        assert_eq!(parse_content_length(&json!("-5")), None);
        assert_eq!(parse_content_length(&json!(true)), None);
    }

    #[test]
    fn test_from_parameters_applies_defaults() {
        let params = bag(json!({
            "downloadUrl": "https://d/file.zip",
            "uploadUrl": "https://u/upload",
        }));

        let request = TransferRequest::from_parameters(&params, 0).unwrap();
        assert_eq!(request, TransferRequest::new("https://d/file.zip", "https://u/upload"));
        assert_eq!(request.method, Method::Post);
        assert!(request.throw_on_error);
        assert_eq!(request.content_length, None);
    }

    #[test]
    fn test_from_parameters_reads_every_field() {
        let params = bag(json!({
            "downloadUrl": "https://d/file.zip",
            "uploadUrl": "https://u/upload",
            "method": "PUT",
            "contentLength": "4096",
            "downloadHeaders": "{\"X-Trace\": \"1\"}",
            "uploadHeaders": {"X-Api-Key": "k"},
            "throwOnError": false,
        }));

        let request = TransferRequest::from_parameters(&params, 3).unwrap();
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.content_length, Some(4096));
        assert_eq!(
            request.download_headers,
            HeaderInput::Text("{\"X-Trace\": \"1\"}".to_string())
        );
        match &request.upload_headers {
            HeaderInput::Structured(map) => assert_eq!(map["X-Api-Key"], json!("k")),
            other => panic!("Expected structured headers, got {other:?}"),
        }
        assert!(!request.throw_on_error);
    }

    #[test]
    fn test_from_parameters_rejects_blank_urls() {
        let params = bag(json!({ "downloadUrl": "   ", "uploadUrl": "https://u/upload" }));
        let err = TransferRequest::from_parameters(&params, 0).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Download URL"));

        let params = bag(json!({ "downloadUrl": "https://d/f" }));
        let err = TransferRequest::from_parameters(&params, 0).unwrap_err();
        assert!(err.to_string().contains("Upload URL"));
    }

    #[test]
    fn test_from_parameters_rejects_unknown_method() {
        let params = bag(json!({
            "downloadUrl": "https://d/f",
            "uploadUrl": "https://u/up",
            "method": "DELETE",
        }));
        assert!(TransferRequest::from_parameters(&params, 0).unwrap_err().is_validation());
    }
}
