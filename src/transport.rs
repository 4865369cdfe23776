//! HTTP transport used to reach the StopForumSpam endpoints.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Error from the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
    /// Timeout.
    #[error("request timed out")]
    Timeout,
    /// Server answered with a non-success status.
    #[error("HTTP {0}")]
    Status(u16),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Http(e)
        }
    }
}

/// Performs a single HTTP GET and hands back the raw body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url`. Returns the complete body on a 2xx status.
    ///
    /// `timeout` overrides any transport-wide default for this call only.
    async fn send(&self, url: &str, timeout: Option<Duration>) -> Result<Vec<u8>, TransportError>;
}

/// reqwest-backed [`Transport`].
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new transport with a client-wide timeout.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("spam-protection/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Create with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, url: &str, timeout: Option<Duration>) -> Result<Vec<u8>, TransportError> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            debug!(status = status.as_u16(), "Non-success HTTP status");
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
