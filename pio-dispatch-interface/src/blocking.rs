//! Blocking transport interface.
//!
//! This module provides the interfaces a backend implements so that a worker thread can execute
//! requests one at a time on a transport it exclusively owns.

mod any;
mod backend;

pub use any::{AnyBlockingBackend, AnyBlockingTransport};
pub use backend::{BlockingBackend, BlockingTransport};
