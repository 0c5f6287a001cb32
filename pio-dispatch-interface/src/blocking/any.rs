//! Type-erased blocking transport traits.
//!
//! The traits in this module are automatically implemented for types that implement the
//! corresponding traits from the `blocking::backend` module, so backend developers don't need
//! to implement them directly.

use std::fmt;

use super::backend::{BlockingBackend, BlockingTransport};
use crate::transport::{BuildTransportResult, TransportOptions};
use crate::{Request, Response};

/// Trait for type-erased blocking backend implementations.
///
/// Automatically implemented for types implementing `BlockingBackend`.
pub trait AnyBlockingBackend: Send + Sync + 'static {
    /// Creates a new boxed transport with the given options.
    fn create_transport(
        &self,
        options: &TransportOptions,
    ) -> BuildTransportResult<Box<dyn AnyBlockingTransport>>;
}

/// Trait for type-erased blocking transports.
///
/// Automatically implemented for types implementing `BlockingTransport`.
pub trait AnyBlockingTransport: Send + 'static {
    /// Provides a textual description of this transport.
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    /// Sends a request and returns the whole response.
    fn execute(&mut self, req: Request) -> crate::Result<Response>;
}

impl<B> AnyBlockingBackend for B
where
    B: BlockingBackend,
{
    fn create_transport(
        &self,
        options: &TransportOptions,
    ) -> BuildTransportResult<Box<dyn AnyBlockingTransport>> {
        Ok(Box::new(BlockingBackend::create_transport(self, options)?))
    }
}

impl<T> AnyBlockingTransport for T
where
    T: BlockingTransport,
{
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        BlockingTransport::describe(self, f)
    }

    fn execute(&mut self, req: Request) -> crate::Result<Response> {
        BlockingTransport::execute(self, req)
    }
}

impl fmt::Debug for dyn AnyBlockingTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.describe(f)
    }
}
