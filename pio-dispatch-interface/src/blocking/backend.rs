//! Core blocking transport traits.
//!
//! Backend developers need to implement the `BlockingBackend` and `BlockingTransport` traits.

use std::fmt;

use crate::transport::{BuildTransportResult, TransportOptions};
use crate::{Request, Response};

/// A transport owned by a single worker.
///
/// Requests are executed one after another through `&mut self`; a transport is never called from
/// two threads at once, which allows implementations to reuse a connection between requests.
pub trait BlockingTransport: Send + 'static {
    /// Provides a textual description of this transport.
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockingTransport")
    }

    /// Sends a request and blocks until the whole response has been received.
    fn execute(&mut self, req: Request) -> crate::Result<Response>;
}

/// Trait for blocking backend implementations.
///
/// A backend is a factory of transports: one is created per worker thread.
pub trait BlockingBackend: Send + Sync + 'static {
    /// The type of transport this backend creates.
    type Transport: BlockingTransport;

    /// Creates a new transport with the given options.
    fn create_transport(&self, options: &TransportOptions)
        -> BuildTransportResult<Self::Transport>;
}
