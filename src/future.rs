use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::handler::ResponseHandler;
use crate::{AsyncResponse, Error, PendingRequest, Result};

/// A single-assignment cell: written once by a worker, read by any number of waiters.
struct Slot<T> {
    result: Mutex<Option<Result<T>>>,
    ready: Condvar,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Result<T>>> {
        self.result.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fill(&self, result: Result<T>) {
        let mut slot = self.lock();
        debug_assert!(slot.is_none(), "request resolved twice");
        *slot = Some(result);
        drop(slot);
        self.ready.notify_all();
    }
}

/// Handle to a submitted request, resolved exactly once by the worker that executes it.
///
/// The handle can be cloned and waited on from several threads; every wait observes the same
/// outcome and none of them triggers another network call.
pub struct AsyncRequest<T> {
    request: Arc<PendingRequest>,
    slot: Arc<Slot<T>>,
}

impl<T> AsyncRequest<T> {
    /// The submitted request.
    pub fn request(&self) -> &PendingRequest {
        &self.request
    }

    /// Whether a worker has resolved the request yet.
    pub fn is_resolved(&self) -> bool {
        self.slot.lock().is_some()
    }
}

impl<T: Clone> AsyncRequest<T> {
    /// Blocks the current thread until the request is resolved, then returns its outcome.
    ///
    /// Returns immediately if already resolved. Calling this again returns the same outcome.
    pub fn wait(&self) -> Result<T> {
        let slot = self
            .slot
            .ready
            .wait_while(self.slot.lock(), |result| result.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        slot.clone().unwrap_or(Err(Error::QueueClosed))
    }

    /// Like [`AsyncRequest::wait`], but gives up after `timeout`, returning `None`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T>> {
        let (slot, _) = self
            .slot
            .ready
            .wait_timeout_while(self.slot.lock(), timeout, |result| result.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        slot.clone()
    }

    /// Returns the outcome if already resolved, without blocking.
    pub fn try_get(&self) -> Option<Result<T>> {
        self.slot.lock().clone()
    }
}

impl<T> Clone for AsyncRequest<T> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
            slot: self.slot.clone(),
        }
    }
}

impl<T> fmt::Debug for AsyncRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncRequest")
            .field("request", &self.request)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// A queued unit of work: a request plus whatever resolves its [`AsyncRequest`].
pub(crate) trait Job: Send {
    fn request(&self) -> &Arc<PendingRequest>;

    /// Runs the response handler on `response` and resolves the request with its result.
    fn complete(self: Box<Self>, response: AsyncResponse);

    /// Resolves the request with `error` without running the handler.
    fn reject(self: Box<Self>, error: Error);
}

pub(crate) struct HandlerJob<H: ResponseHandler> {
    request: Arc<PendingRequest>,
    handler: H,
    slot: Option<Arc<Slot<H::Output>>>,
    outstanding: Arc<AtomicUsize>,
}

/// Creates a job and the handle observing it. `outstanding` is incremented now and decremented
/// when the job is resolved.
pub(crate) fn pair<H: ResponseHandler>(
    request: PendingRequest,
    handler: H,
    outstanding: Arc<AtomicUsize>,
) -> (AsyncRequest<H::Output>, Box<dyn Job>) {
    let request = Arc::new(request);
    let slot = Arc::new(Slot::new());
    outstanding.fetch_add(1, Ordering::AcqRel);
    let handle = AsyncRequest {
        request: request.clone(),
        slot: slot.clone(),
    };
    let job = HandlerJob {
        request,
        handler,
        slot: Some(slot),
        outstanding,
    };
    (handle, Box::new(job))
}

impl<H: ResponseHandler> HandlerJob<H> {
    fn resolve(&mut self, result: Result<H::Output>) {
        let Some(slot) = self.slot.take() else {
            return;
        };
        // Decrement first so a caller that has observed every result also observes a zero count.
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
        slot.fill(result);
    }
}

impl<H: ResponseHandler> Job for HandlerJob<H> {
    fn request(&self) -> &Arc<PendingRequest> {
        &self.request
    }

    fn complete(mut self: Box<Self>, response: AsyncResponse) {
        let result = match panic::catch_unwind(AssertUnwindSafe(|| self.handler.handle(&response)))
        {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(request = %self.request, "response handler panicked");
                Err(Error::HandlerPanicked {
                    request: self.request.clone(),
                })
            }
        };
        self.resolve(result);
    }

    fn reject(mut self: Box<Self>, error: Error) {
        self.resolve(Err(error));
    }
}

impl<H: ResponseHandler> Drop for HandlerJob<H> {
    fn drop(&mut self) {
        // A job must never vanish unresolved, or its waiters would block forever.
        self.resolve(Err(Error::QueueClosed));
    }
}
