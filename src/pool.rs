use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use pio_dispatch_interface::blocking::AnyBlockingTransport;
use pio_dispatch_interface::Error as TransportError;

use crate::future::Job;
use crate::queue::RequestQueue;
use crate::{AsyncResponse, ConfigError, Error};

pub(crate) type JobQueue = RequestQueue<Box<dyn Job>>;

/// Fixed set of worker threads draining one [`JobQueue`], one transport per worker.
pub(crate) struct WorkerPool {
    workers: Mutex<Vec<JoinHandle<()>>>,
    len: usize,
}

impl WorkerPool {
    /// Spawns one worker per transport. On failure the queue is closed and already started
    /// workers are joined before returning.
    pub fn spawn(
        transports: Vec<Box<dyn AnyBlockingTransport>>,
        queue: Arc<JobQueue>,
        base_url: Arc<str>,
    ) -> Result<Self, ConfigError> {
        if transports.is_empty() {
            return Err(ConfigError::ZeroThreads);
        }
        let len = transports.len();
        let mut workers = Vec::with_capacity(len);
        for (index, transport) in transports.into_iter().enumerate() {
            let spawned = thread::Builder::new()
                .name(format!("pio-worker-{index}"))
                .spawn({
                    let queue = queue.clone();
                    let base_url = base_url.clone();
                    move || work(index, transport, &queue, &base_url)
                });
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    tracing::error!(index, error = %e, "failed to spawn worker");
                    queue.close();
                    for handle in workers {
                        handle.join().ok();
                    }
                    return Err(ConfigError::Spawn(Arc::new(e)));
                }
            }
        }
        tracing::debug!(threads = len, "worker pool started");
        Ok(Self {
            workers: Mutex::new(workers),
            len,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Waits for every worker to exit. The queue must already be closed or aborted.
    ///
    /// Later calls return immediately. A panic escaping a worker is resumed here. Called from a
    /// worker itself, that worker is detached instead; it exits once the queue is drained.
    pub fn join(&self) {
        let current = thread::current().id();
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        for handle in workers.drain(..) {
            if handle.thread().id() == current {
                tracing::debug!("detaching the joining worker");
                continue;
            }
            if let Err(e) = handle.join() {
                panic::resume_unwind(e);
            }
        }
    }
}

fn work(
    index: usize,
    mut transport: Box<dyn AnyBlockingTransport>,
    queue: &JobQueue,
    base_url: &str,
) {
    let _span = tracing::debug_span!("worker", index).entered();
    tracing::trace!(transport = ?transport, "worker started");
    while let Some(job) = queue.dequeue() {
        let request = job.request().clone();
        let wire = match request.to_wire(base_url) {
            Ok(wire) => wire,
            Err(e) => {
                job.reject(Error::Json {
                    request,
                    source: Arc::new(e),
                });
                continue;
            }
        };
        tracing::trace!(%request, "executing");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| transport.execute(wire)))
            .unwrap_or_else(|_| {
                tracing::error!(%request, "transport panicked");
                Err(TransportError::Io(io::Error::other("transport panicked")))
            });
        match &outcome {
            Ok(res) => tracing::debug!(%request, status = res.status, "response received"),
            Err(e) => tracing::debug!(%request, error = %e, "request failed"),
        }
        job.complete(AsyncResponse::new(request, outcome));
    }
    tracing::debug!("worker stopped");
}
