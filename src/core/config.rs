//! Transport configuration for stream-relay

use std::time::Duration;

/// Configuration of the HTTP transport shared by both legs
#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    /// User-Agent sent on both legs
    pub user_agent: String,

    /// Maximum time to establish a connection
    pub connect_timeout: Option<Duration>,

    /// Overall time limit per request, body included.
    ///
    /// Unset by default: a large relay may legitimately run for hours.
    pub request_timeout: Option<Duration>,

    /// How long idle pooled connections are kept
    pub pool_idle_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("stream-relay/{}", env!("STREAM_RELAY_VERSION")),
            connect_timeout: Some(Duration::from_secs(10)),
            request_timeout: None,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}
