//! Error types for stream-relay
//!
//! Every failure a transfer can hit, from an empty URL to a rejected upload.

use std::fmt;

use crate::core::request::Method;

/// Main error type for stream-relay operations
#[derive(Debug)]
pub enum Error {
    /// Request parameters are missing or malformed (empty URL, unknown method)
    Validation(String),

    /// The download request could not be dispatched (DNS, refused connection, bad URL)
    DownloadRequestFailed(String),

    /// The download endpoint answered with a non-2xx status
    DownloadFailed { status: u16, url: String },

    /// The upload endpoint answered with a non-2xx status
    UploadFailed {
        status: u16,
        url: String,
        method: Method,
        download_status: Option<u16>,
    },

    /// Anything else that broke the pipeline after validation
    Transfer(String),

    /// A pipeline failure re-raised with the URLs of the transfer attached
    Context { message: String, cause: Box<Error> },

    /// File I/O error
    IoError(std::io::Error),
}

impl Error {
    /// Status code of the download leg, when the failure happened after it was known
    pub fn download_status(&self) -> Option<u16> {
        match self {
            Error::DownloadFailed { status, .. } => Some(*status),
            Error::UploadFailed { download_status, .. } => *download_status,
            Error::Context { cause, .. } => cause.download_status(),
            _ => None,
        }
    }

    /// Status code of the upload leg, if the upload got a response
    pub fn upload_status(&self) -> Option<u16> {
        match self {
            Error::UploadFailed { status, .. } => Some(*status),
            Error::Context { cause, .. } => cause.upload_status(),
            _ => None,
        }
    }

    /// Whether this error comes from input validation and must always be raised
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Message with URL context for surfacing at the host boundary.
    ///
    /// Messages that already name the download or upload URL pass through unchanged.
    pub fn url_context_message(&self, download_url: &str, upload_url: &str) -> String {
        let message = self.to_string();
        if message.contains("Download URL") || message.contains("Upload URL") {
            message
        } else {
            format!(
                "File transfer failed: {message}. Download URL: {download_url}, Upload URL: {upload_url}"
            )
        }
    }

    /// Wrap this error for raising at the host boundary
    pub fn with_url_context(self, download_url: &str, upload_url: &str) -> Error {
        let message = self.url_context_message(download_url, upload_url);
        Error::Context {
            message,
            cause: Box::new(self),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(msg) => write!(f, "{}", msg),
            Error::DownloadRequestFailed(msg) => {
                write!(f, "Download request failed: {}", msg)
            }
            Error::DownloadFailed { status, url } => {
                write!(
                    f,
                    "Download failed with HTTP {} from {}. Please verify the download URL is accessible and returns a successful response.",
                    status, url
                )
            }
            Error::UploadFailed {
                status,
                url,
                method,
                download_status,
            } => {
                write!(
                    f,
                    "Upload failed with HTTP {} to {}. Please verify the upload URL is correct, authentication is valid, and the endpoint accepts {} requests.",
                    status, url, method
                )?;
                if let Some(download_status) = download_status {
                    write!(f, " (download status: {})", download_status)?;
                }
                Ok(())
            }
            Error::Transfer(msg) => write!(f, "{}", msg),
            Error::Context { message, .. } => write!(f, "{}", message),
            Error::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            Error::Context { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transfer(err.to_string())
    }
}

/// Convenience result type for stream-relay operations
pub type Result<T> = std::result::Result<T, Error>;
