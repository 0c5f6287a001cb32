//! The connection: a request queue drained by a fixed pool of workers.

mod builder;
mod options;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use url::Url;

use pio_dispatch_interface::blocking::AnyBlockingBackend;

use crate::future::{self, AsyncRequest};
use crate::handler::{self, ResponseHandler};
use crate::pool::{JobQueue, WorkerPool};
use crate::{ConfigError, Error, PendingRequest, Result};

pub use builder::ConnectionBuilder;
pub use options::{ConnectionOptions, DEFAULT_TIMEOUT, DEFAULT_URL};

/// Lifecycle of a [`Connection`]. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Accepting submissions.
    Open,
    /// Rejecting submissions while the workers finish.
    Closing,
    /// Every worker has exited.
    Closed,
}

/// Dispatches requests to an event server on background worker threads.
///
/// Requests are submitted together with a [response handler](crate::handler) and queued; each
/// worker takes the oldest request, executes it over its own transport, runs the handler and
/// resolves the returned [`AsyncRequest`].
///
/// # Thread safety
///
/// The connection can be shared between threads. Any number of threads may submit concurrently;
/// with a bounded queue, submitters block while it is full.
///
/// Dropping an open connection closes it, waiting for queued requests to finish. If the last
/// reference goes away on one of its own workers, for example inside a response handler, that
/// worker is left to finish the queue on its own.
pub struct Connection {
    base_url: Arc<str>,
    options: ConnectionOptions,
    queue: Arc<JobQueue>,
    pool: WorkerPool,
    outstanding: Arc<AtomicUsize>,
    state: Mutex<ConnectionState>,
}

impl Connection {
    /// Shortcut for [`ConnectionBuilder::new`].
    pub fn builder(url: impl Into<String>) -> ConnectionBuilder {
        ConnectionBuilder::new(url)
    }

    pub(crate) fn open(
        options: ConnectionOptions,
        backend: &dyn AnyBlockingBackend,
    ) -> Result<Self> {
        let base_url = parse_base_url(&options.url)?;
        if options.threads == 0 {
            return Err(ConfigError::ZeroThreads.into());
        }
        let transport_options = options.transport_options();
        let transports = (0..options.threads)
            .map(|_| backend.create_transport(&transport_options))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(ConfigError::from)?;
        let queue = Arc::new(JobQueue::new(options.queue_capacity));
        let pool = WorkerPool::spawn(transports, queue.clone(), base_url.clone())?;
        tracing::debug!(
            url = %base_url,
            threads = options.threads,
            queue_capacity = options.queue_capacity,
            "connection opened"
        );
        Ok(Self {
            base_url,
            options,
            queue,
            pool,
            outstanding: Arc::new(AtomicUsize::new(0)),
            state: Mutex::new(ConnectionState::Open),
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues `request`, to be interpreted by `handler` once a worker has executed it.
    ///
    /// Blocks while a bounded queue is full. Fails with [`Error::QueueClosed`] once the
    /// connection is closing, without any network call.
    pub fn submit<H: ResponseHandler>(
        &self,
        request: PendingRequest,
        handler: H,
    ) -> Result<AsyncRequest<H::Output>> {
        if self.queue.is_closed() {
            return Err(Error::QueueClosed);
        }
        let (handle, job) = future::pair(request, handler, self.outstanding.clone());
        tracing::trace!(request = %handle.request(), "submitting");
        // A job handed back by a queue closed in the meantime resolves itself when dropped.
        self.queue.enqueue(job).map_err(|_| Error::QueueClosed)?;
        Ok(handle)
    }

    /// Number of submitted requests not resolved yet.
    pub fn pending_requests(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Stops accepting requests, lets the workers finish every queued one and waits for them.
    ///
    /// Idempotent. Concurrent callers all return once the workers have exited.
    pub fn close(&self) {
        {
            let mut state = self.lock_state();
            if *state == ConnectionState::Open {
                *state = ConnectionState::Closing;
                tracing::debug!(pending = self.pending_requests(), "closing connection");
            }
        }
        self.queue.close();
        self.finish();
    }

    /// Like [`Connection::close`], but requests no worker has picked up yet are resolved with
    /// [`Error::QueueClosed`] instead of being executed. In-flight requests still complete.
    pub fn abort(&self) {
        {
            let mut state = self.lock_state();
            if *state == ConnectionState::Open {
                *state = ConnectionState::Closing;
            }
        }
        let rejected = self.queue.abort();
        tracing::debug!(rejected = rejected.len(), "aborting connection");
        for job in rejected {
            job.reject(Error::QueueClosed);
        }
        self.finish();
    }

    fn finish(&self) {
        self.pool.join();
        let mut state = self.lock_state();
        if *state != ConnectionState::Closed {
            *state = ConnectionState::Closed;
            tracing::debug!("connection closed");
        }
    }

    /// Checks that the event server is alive, returning its status page.
    pub fn get_status(&self) -> Result<String> {
        self.submit(PendingRequest::get("/"), handler::status())?.wait()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.lock_state()
    }

    /// The normalized base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.len()
    }

    /// Queue capacity, `0` meaning unbounded.
    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.options.timeout
    }

    /// The options the connection was opened with.
    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if self.state() != ConnectionState::Closed {
            self.close();
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.base_url)
            .field("state", &self.state())
            .field("threads", &self.threads())
            .field("queued", &self.queue.len())
            .field("pending", &self.pending_requests())
            .finish()
    }
}

fn parse_base_url(url: &str) -> std::result::Result<Arc<str>, ConfigError> {
    let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(ConfigError::UnsupportedScheme(scheme.into())),
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!("{url}: missing host")));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "{url}: query and fragment are not allowed"
        )));
    }
    Ok(parsed.as_str().trim_end_matches('/').into())
}
