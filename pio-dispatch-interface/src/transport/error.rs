//! Error types for transport building operations.

use thiserror::Error;

use crate::Error as BackendError;

/// Errors that can occur when a backend builds a transport.
#[derive(Debug, Error)]
pub enum BuildTransportError {
    /// No backend has been registered.
    #[error("No backend registered")]
    NoBackend,
    /// An error occurred in the backend implementation.
    #[error("Error creating transport: {0}")]
    BackendError(#[from] BackendError),
}

/// Result type for transport building operations.
pub type BuildTransportResult<T> = Result<T, BuildTransportError>;
