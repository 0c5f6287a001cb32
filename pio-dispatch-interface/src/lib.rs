//! Transport interface definitions for pio-dispatch backends.
//!
//! This crate provides the interface that HTTP backends must implement to be driven by the
//! pio-dispatch worker pool. It defines the wire-level request and response types, the transport
//! error type and the traits a backend implements.
//!
//! ## Transports
//!
//! A backend does not perform requests itself. Instead, it builds one
//! [`blocking::BlockingTransport`] for every worker thread of a connection. A transport is owned
//! by exactly one worker and is never shared, so an implementation is free to keep a persistent
//! connection or handle inside.
//!
//! ## Backend Registration
//!
//! Backend implementations may register themselves using the `register_backend` function so
//! that connections can be built without naming a backend explicitly.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod blocking;
mod error;
#[doc(hidden)] // For pio-dispatch facade only
pub mod register;
mod request;
mod response;
pub mod transport;

pub use error::{Error, Result};
pub use register::register_backend;
pub use request::{Body, Method, Request};
pub use response::Response;
