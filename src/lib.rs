//! Bounded, multi-threaded request dispatch for PredictionIO-style event servers.
//!
//! ## Overview
//!
//! A [`Connection`] accepts request descriptions from any number of threads, queues them and
//! executes them on a fixed pool of worker threads. Submitting returns an [`AsyncRequest`]
//! immediately; the caller collects the outcome later with [`AsyncRequest::wait`]. Each request
//! is paired at submission with a [response handler](handler) that turns the raw HTTP outcome
//! into either a domain value or a typed [`Error`].
//!
//! ```no_run
//! use pio_dispatch::{handler, Connection, PendingRequest};
//!
//! let connection = Connection::builder("http://localhost:7070").threads(4).build()?;
//! let created = connection.submit(
//!     PendingRequest::post("/events.json")
//!         .with_query("accessKey", "secret")
//!         .with_field("event", "rate")
//!         .with_field("entityType", "user")
//!         .with_field("entityId", "u1"),
//!     handler::create(),
//! )?;
//! // ... do other work ...
//! created.wait()?;
//! connection.close();
//! # Ok::<_, pio_dispatch::Error>(())
//! ```
//!
//! ## Backpressure
//!
//! With a non-zero `queue_capacity`, [`Connection::submit`] blocks while that many requests are
//! waiting for a worker. Capacity `0` leaves the queue unbounded.
//!
//! ## Shutdown
//!
//! [`Connection::close`] stops accepting requests, lets the workers finish everything already
//! queued and joins them. [`Connection::abort`] does the same but resolves requests still in the
//! queue with [`Error::QueueClosed`]. Dropping an open connection closes it.
//!
//! ## Backends
//!
//! HTTP is performed by a backend implementing the traits in [`pio-dispatch-interface`]. With the
//! default `curl` feature, [`ConnectionBuilder::build`] falls back to the libcurl backend when
//! no other backend has been registered with [`register_backend`]. Any backend can also be
//! passed explicitly to [`ConnectionBuilder::build_with`].
//!
//! ## Features
//!
//! - `curl` (default): use the libcurl backend when none is registered.
//! - `ssl`: enable TLS in the libcurl backend.
//!
//! [`pio-dispatch-interface`]: pio_dispatch_interface

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

mod connection;
mod error;
mod future;
pub mod handler;
mod pool;
pub mod queue;
mod request;
mod response;
mod status;

pub use connection::{
    Connection, ConnectionBuilder, ConnectionOptions, ConnectionState, DEFAULT_TIMEOUT,
    DEFAULT_URL,
};
pub use error::{ConfigError, Error, Result};
pub use future::AsyncRequest;
#[doc(inline)]
pub use handler::ResponseHandler;
pub use pio_dispatch_interface::{register_backend, Method};
pub use request::PendingRequest;
pub use response::AsyncResponse;
pub use status::StatusCode;

/// The libcurl backend.
#[cfg(feature = "curl")]
#[cfg_attr(docsrs, doc(cfg(feature = "curl")))]
pub use pio_dispatch_backend_curl as curl;

/// Transport interface re-exported for backend implementors and tests.
pub use pio_dispatch_interface as interface;
