//! Error types for spam protection lookups and reports.

use crate::transport::TransportError;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by lookups, report submissions and configuration.
///
/// Every variant is returned to the immediate caller; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller supplied an unusable argument (missing value, zero threshold, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Subject type is not one of `ip`, `email` or `username`.
    #[error("type of {0} is not supported by the API")]
    UnsupportedSubjectType(String),

    /// A report was attempted without an API key.
    #[error("an API key is required to submit a spam report")]
    MissingApiKey,

    /// Network, DNS, timeout or non-success HTTP status.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Response body is not the expected JSON document.
    #[error("invalid response: {0}")]
    Parse(String),

    /// The service answered with `success = 0`.
    #[error("remote service rejected the query: {0}")]
    RemoteRejected(String),

    /// The report endpoint did not confirm the submission.
    #[error("spam report submission failed: {0}")]
    SubmissionFailed(String),

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the same call may succeed if tried again later.
    ///
    /// Only transport failures qualify. Remote rejections and parse errors
    /// point at a service problem, the rest are caller mistakes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}
