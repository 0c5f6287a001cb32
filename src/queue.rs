//! Bounded hand-off between submitting threads and workers.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{bounded, unbounded, Receiver, Select, Sender, TryRecvError, TrySendError};

/// A FIFO queue with blocking enqueue/dequeue and a one-way closed state.
///
/// A capacity of `0` means unbounded: [`RequestQueue::enqueue`] then never blocks.
pub struct RequestQueue<T> {
    senders: Mutex<Option<Senders<T>>>,
    items: Receiver<T>,
    closed: Receiver<()>,
    capacity: usize,
}

/// Dropped together on close: `items` lets workers see the end of the stream, `_closed` wakes
/// enqueuers blocked on a full channel.
struct Senders<T> {
    items: Sender<T>,
    _closed: Sender<()>,
}

/// Returned by [`RequestQueue::enqueue`] once the queue is closed, handing the item back.
pub struct EnqueueError<T>(pub T);

impl<T> From<TrySendError<T>> for EnqueueError<T> {
    fn from(e: TrySendError<T>) -> Self {
        Self(e.into_inner())
    }
}

impl<T> RequestQueue<T> {
    /// Creates an open queue holding at most `capacity` items, or any number if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        let (items_tx, items_rx) = if capacity == 0 {
            unbounded()
        } else {
            bounded(capacity)
        };
        let (closed_tx, closed_rx) = bounded(0);
        Self {
            senders: Mutex::new(Some(Senders {
                items: items_tx,
                _closed: closed_tx,
            })),
            items: items_rx,
            closed: closed_rx,
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Senders<T>>> {
        self.senders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an item, blocking while the queue is at capacity.
    ///
    /// Fails once the queue has been closed, including when it is closed while this call is
    /// waiting for room.
    pub fn enqueue(&self, mut item: T) -> Result<(), EnqueueError<T>> {
        let Some(sender) = self.lock().as_ref().map(|senders| senders.items.clone()) else {
            return Err(EnqueueError(item));
        };
        let mut select = Select::new();
        select.send(&sender);
        select.recv(&self.closed);
        loop {
            // Nothing is ever sent on `closed`; it only disconnects.
            if let Err(TryRecvError::Disconnected) = self.closed.try_recv() {
                return Err(EnqueueError(item));
            }
            match sender.try_send(item) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(back)) => item = back,
                Err(e) => return Err(e.into()),
            }
            select.ready();
        }
    }

    /// Removes the oldest item, blocking while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub fn dequeue(&self) -> Option<T> {
        self.items.recv().ok()
    }

    /// Closes the queue. Further enqueues fail; items already queued are still handed out by
    /// [`RequestQueue::dequeue`] until it is drained.
    pub fn close(&self) {
        drop(self.lock().take());
    }

    /// Closes the queue and takes out every item nobody has dequeued yet.
    pub fn abort(&self) -> Vec<T> {
        self.close();
        self.items.try_iter().collect()
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no item is queued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether [`RequestQueue::close`] or [`RequestQueue::abort`] has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    /// The configured capacity, `0` meaning unbounded.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> fmt::Debug for RequestQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T> fmt::Debug for EnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EnqueueError(..)")
    }
}

impl<T> fmt::Display for EnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("request queue is closed")
    }
}

impl<T> std::error::Error for EnqueueError<T> {}
