//! Error types for templeweb-client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Upstream rejected the request: {message}")]
    Rejected { message: String },

    #[error("Unexpected response: {message}")]
    Decode { message: String },

    #[error("Invalid upstream URL: {url}")]
    InvalidUrl { url: String },
}

impl ClientError {
    /// Whether trying the same request again may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ClientError::Status { status, .. } => *status >= 500,
            ClientError::Rejected { .. } | ClientError::Decode { .. } | ClientError::InvalidUrl { .. } => false,
        }
    }
}

/// Result type with ClientError
pub type ClientResult<T> = Result<T, ClientError>;
