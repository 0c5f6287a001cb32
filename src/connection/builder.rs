use std::time::Duration;

use pio_dispatch_interface::blocking::{AnyBlockingBackend, BlockingBackend};
use pio_dispatch_interface::register::BACKEND;

use super::{Connection, ConnectionOptions};
use crate::Result;

/// Builds a [`Connection`], consuming itself at each step.
///
/// ```no_run
/// use std::time::Duration;
/// use pio_dispatch::ConnectionBuilder;
///
/// let connection = ConnectionBuilder::new("http://localhost:7070")
///     .threads(4)
///     .queue_capacity(100)
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// # Ok::<_, pio_dispatch::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConnectionBuilder {
    options: ConnectionOptions,
}

impl ConnectionBuilder {
    /// Starts from the default options with the given base URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self::default().url(url)
    }

    /// Sets the base URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.options.url = url.into();
        self
    }

    /// Sets the number of worker threads.
    pub fn threads(mut self, threads: usize) -> Self {
        self.options.threads = threads;
        self
    }

    /// Sets the queue capacity; `0` means unbounded.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.options.queue_capacity = capacity;
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.options.user_agent = Some(user_agent.into());
        self
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options
            .default_headers
            .push((name.into(), value.into()));
        self
    }

    /// Caps the size of a buffered response body.
    pub fn max_response_buffer_size(mut self, size: u64) -> Self {
        self.options.max_response_buffer_size = Some(size);
        self
    }

    /// The options collected so far.
    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    /// Opens a connection using the registered backend, or the curl backend when the `curl`
    /// feature is enabled and nothing was registered.
    pub fn build(self) -> Result<Connection> {
        match BACKEND.get() {
            Some(backend) => Connection::open(self.options, &**backend),
            None => Connection::open(self.options, fallback_backend()?),
        }
    }

    /// Opens a connection using `backend`.
    pub fn build_with(self, backend: impl BlockingBackend) -> Result<Connection> {
        Connection::open(self.options, &backend)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "curl")] {
        fn fallback_backend() -> Result<&'static dyn AnyBlockingBackend> {
            Ok(&pio_dispatch_backend_curl::CurlBackend)
        }
    } else {
        fn fallback_backend() -> Result<&'static dyn AnyBlockingBackend> {
            Err(crate::ConfigError::NoBackend.into())
        }
    }
}

impl From<ConnectionOptions> for ConnectionBuilder {
    fn from(options: ConnectionOptions) -> Self {
        Self { options }
    }
}
