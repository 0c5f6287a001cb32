use std::borrow::Cow;
use std::io;
use std::sync::Arc;

use thiserror::Error;

use pio_dispatch_interface::transport::BuildTransportError;
use pio_dispatch_interface::Error as TransportError;

use crate::{PendingRequest, StatusCode};

/// The errors a dispatched request, or the setup of a connection, can end with.
///
/// Resolved outcomes are kept by their [`crate::AsyncRequest`] and handed out on every wait, so
/// the error is cheap to clone: non-`Clone` sources are shared behind `Arc`.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum Error {
    /// The connection could not be set up.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
    /// The request was submitted after the connection started closing, or was still queued when
    /// the connection was aborted.
    #[error("request queue is closed")]
    QueueClosed,
    /// The HTTP exchange itself failed: DNS lookup, connect or timeout.
    #[error("transport failure for request {request}: {source}")]
    Transport {
        /// The request that failed.
        request: Arc<PendingRequest>,
        /// The error reported by the transport.
        source: Arc<TransportError>,
    },
    /// A create-style call did not receive `201 Created`.
    #[error("request {request} was not created: status {status}, body {body}")]
    NotCreated {
        /// The offending request.
        request: Arc<PendingRequest>,
        /// The status received instead.
        status: StatusCode,
        /// The response body, decoded lossily.
        body: String,
    },
    /// A get-, delete- or query-style call did not receive the expected status.
    #[error("{what} not found for request {request}: status {status}, body {body}")]
    NotFound {
        /// What the call was looking for, e.g. `event` or `recommendation`.
        what: Cow<'static, str>,
        /// The offending request.
        request: Arc<PendingRequest>,
        /// The status received instead.
        status: StatusCode,
        /// The response body, decoded lossily.
        body: String,
    },
    /// The server status check did not receive the expected status.
    #[error("unexpected server status for request {request}: status {status}, body {body}")]
    ServerStatus {
        /// The offending request.
        request: Arc<PendingRequest>,
        /// The status received instead.
        status: StatusCode,
        /// The response body, decoded lossily.
        body: String,
    },
    /// The request body could not be encoded, or a successful response carried a body that is
    /// not the expected JSON.
    #[error("malformed JSON for request {request}: {source}")]
    Json {
        /// The request concerned.
        request: Arc<PendingRequest>,
        /// The underlying serde error.
        source: Arc<serde_json::Error>,
    },
    /// The response handler panicked while interpreting the response.
    #[error("response handler panicked for request {request}")]
    HandlerPanicked {
        /// The request whose response was being handled.
        request: Arc<PendingRequest>,
    },
}

impl Error {
    /// The request this error is about, if it concerns a single request.
    pub fn request(&self) -> Option<&PendingRequest> {
        match self {
            Error::Configuration(_) | Error::QueueClosed => None,
            Error::Transport { request, .. }
            | Error::NotCreated { request, .. }
            | Error::NotFound { request, .. }
            | Error::ServerStatus { request, .. }
            | Error::Json { request, .. }
            | Error::HandlerPanicked { request } => Some(request),
        }
    }

    /// The status of the response this error was built from, if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::NotCreated { status, .. }
            | Error::NotFound { status, .. }
            | Error::ServerStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the HTTP exchange failed before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

/// Reasons a connection cannot be built.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ConfigError {
    /// The URL could not be parsed or has no host.
    #[error("url is not valid: {0}")]
    InvalidUrl(String),
    /// The URL uses a scheme other than `http` or `https`.
    #[error("unsupported url scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),
    /// The worker pool was configured with zero threads.
    #[error("thread count must be at least 1")]
    ZeroThreads,
    /// No backend was given and none has been registered.
    #[error("no backend registered. Enable the `curl` feature or register a backend at program startup.")]
    NoBackend,
    /// The backend failed to create a transport for a worker.
    #[error("error creating transport: {0}")]
    Backend(#[source] Arc<BuildTransportError>),
    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] Arc<io::Error>),
}

impl From<BuildTransportError> for ConfigError {
    fn from(e: BuildTransportError) -> Self {
        match e {
            BuildTransportError::NoBackend => Self::NoBackend,
            e => Self::Backend(Arc::new(e)),
        }
    }
}

/// A `Result` alias where the `Err` case is [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;
