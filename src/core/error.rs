use reqwest::header::HeaderMap;
use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The network call itself could not complete (connectivity, DNS, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server answered with a non-success status.
    ///
    /// The response is kept whole so callers can inspect what came back.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
        /// Response headers as received.
        headers: HeaderMap,
        /// The raw response body, or `None` if reading it failed.
        body: Option<String>,
    },

    /// A body could not be decoded as JSON.
    #[error("JSON decoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// A resolved body was read in a shape it does not have.
    #[error("Data format unexpected: {0}")]
    Data(String),
}

impl FetchError {
    /// The HTTP status of a response failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
