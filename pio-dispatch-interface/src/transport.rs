//! Transport configuration and building.
//!
//! This module provides the options handed to a backend when it builds a transport, and the
//! errors it may report while doing so.

mod error;
mod options;

pub use error::{BuildTransportError, BuildTransportResult};
pub use options::TransportOptions;
