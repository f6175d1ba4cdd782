//! Header resolution for both legs of a transfer
//!
//! Parses user-supplied header parameters, merges them over the built-in
//! defaults and promotes a `bearer` query parameter on the upload URL to an
//! `Authorization` header.

use std::collections::BTreeMap;

use log::debug;
use reqwest::Url;
use serde_json::{Map, Value};

use crate::core::request::{HeaderInput, TransferRequest};

/// Header name to value, names kept exactly as supplied
pub type Headers = BTreeMap<String, String>;

pub const ACCEPT: &str = "Accept";
pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_TYPE: &str = "Content-Type";

const DEFAULT_ACCEPT: &str = "*/*";
const DEFAULT_UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// Final headers for the download and upload legs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedHeaders {
    pub download: Headers,
    pub upload: Headers,
}

impl ResolvedHeaders {
    /// Whether the upload already carries a Content-Length (from the request or the user)
    pub fn has_upload_content_length(&self) -> bool {
        has_header(&self.upload, CONTENT_LENGTH)
    }

    /// Set the upload Content-Length unless one is already present. Returns true if set.
    pub fn set_upload_content_length_if_absent(&mut self, length: u64) -> bool {
        if length == 0 || self.has_upload_content_length() {
            return false;
        }
        self.upload
            .insert(CONTENT_LENGTH.to_string(), length.to_string());
        true
    }
}

/// Parse a header parameter into a name/value mapping.
///
/// Never fails: malformed JSON, non-object JSON and empty input all yield an empty
/// mapping. Only string and number values are kept; numbers are rendered in decimal.
pub fn parse_headers(input: &HeaderInput) -> Headers {
    match input {
        HeaderInput::Text(text) => {
            if text.trim().is_empty() {
                return Headers::new();
            }
            match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => collect_scalar_headers(&map),
                Ok(_) => Headers::new(),
                Err(e) => {
                    debug!("Ignoring malformed header JSON: {e}");
                    Headers::new()
                }
            }
        }
        HeaderInput::Structured(map) => collect_scalar_headers(map),
    }
}

fn collect_scalar_headers(map: &Map<String, Value>) -> Headers {
    map.iter()
        .filter_map(|(name, value)| match value {
            Value::String(s) => Some((name.clone(), s.clone())),
            Value::Number(n) => Some((name.clone(), n.to_string())),
            _ => None,
        })
        .collect()
}

/// Return the `bearer` query parameter of the upload URL, if present and non-empty.
///
/// The URL itself is left untouched; some receivers expect the token to stay in
/// the query string as well. Unparseable URLs simply carry no token.
pub fn extract_bearer_token(upload_url: &str) -> Option<String> {
    let url = Url::parse(upload_url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "bearer")
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
}

/// Case-insensitive header presence check
pub fn has_header(headers: &Headers, name: &str) -> bool {
    headers.keys().any(|key| key.eq_ignore_ascii_case(name))
}

/// Insert a header, replacing any existing entry whose name matches case-insensitively
pub fn insert_header(headers: &mut Headers, name: &str, value: String) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value);
}

fn merge_over(defaults: Headers, overrides: Headers) -> Headers {
    let mut merged = defaults;
    for (name, value) in overrides {
        insert_header(&mut merged, &name, value);
    }
    merged
}

/// Build the headers for both legs of a request.
///
/// Order of precedence on the upload leg: built-in `Content-Type`, then the user's
/// headers, then `Authorization: Bearer <token>` only when no authorization header
/// was supplied. An explicit content length on the request is set last and wins.
pub fn resolve_headers(request: &TransferRequest) -> ResolvedHeaders {
    let download_defaults = Headers::from([(ACCEPT.to_string(), DEFAULT_ACCEPT.to_string())]);
    let download = merge_over(download_defaults, parse_headers(&request.download_headers));

    let upload_defaults = Headers::from([(
        CONTENT_TYPE.to_string(),
        DEFAULT_UPLOAD_CONTENT_TYPE.to_string(),
    )]);
    let mut upload = merge_over(upload_defaults, parse_headers(&request.upload_headers));

    if let Some(token) = extract_bearer_token(&request.upload_url) {
        if !has_header(&upload, AUTHORIZATION) {
            debug!("Promoting bearer query parameter to Authorization header");
            upload.insert(AUTHORIZATION.to_string(), format!("Bearer {token}"));
        }
    }

    if let Some(length) = request.content_length.filter(|length| *length > 0) {
        insert_header(&mut upload, CONTENT_LENGTH, length.to_string());
    }

    ResolvedHeaders { download, upload }
}
