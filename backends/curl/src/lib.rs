//! libcurl transport backend for pio-dispatch.
//!
//! Every transport built by [`CurlBackend`] owns a single `curl` easy handle. Handles are reused
//! across the requests executed by the same worker, so keep-alive connections survive between
//! calls, but they are never shared with another worker.

mod blocking;
mod error;
mod handler;
mod request;

pub use blocking::CurlTransport;

/// The libcurl backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlBackend;

/// Initializes libcurl. Called by [`register`], and should be called before spawning threads if
/// the backend is used without registration.
pub fn init() {
    curl::init();
}

/// Initializes libcurl and registers [`CurlBackend`] as the default backend.
pub fn register() {
    init();
    pio_dispatch_interface::register_backend(CurlBackend);
}
