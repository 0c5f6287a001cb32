//! Error types for transport operations.

use thiserror::Error;

/// Errors a transport can run into while exchanging a single request.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend does not accept the input as a valid URL.
    #[error("Invalid URL")]
    InvalidUrl,
    /// An underlying I/O error occurred, such as a refused connection or a failed DNS lookup.
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// The response body exceeds the maximum allowed size.
    #[error("Response body size exceeds max limit")]
    ResponseTooLarge,
    /// The request did not finish within the configured timeout.
    #[error("Request is not finished within timeout")]
    RequestTimeout,
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, Error>;
