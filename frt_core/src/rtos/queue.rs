// Bounded FIFO queue primitive

use super::{check_capacity, Timeout, MAX_QUEUE_CAPACITY};
use crate::error::FrtResult;
use crossbeam::channel::{self, Receiver, Sender};
use std::fmt;
use std::sync::Arc;

/// Fixed-capacity, thread-safe FIFO carrying values of `T`
///
/// Values are moved in and out; a queue never refers back to the sender's
/// storage once `send` returns.
pub trait RtosQueue<T>: Send + Sync {
    /// Enqueue at the back, blocking at most `timeout` for space.
    /// The item is handed back if it could not be enqueued.
    fn send(&self, item: T, timeout: Timeout) -> Result<(), T>;

    /// Dequeue from the front, blocking at most `timeout` for an item
    fn receive(&self, timeout: Timeout) -> Option<T>;

    /// Number of items currently waiting
    fn depth(&self) -> usize;

    /// Maximum number of items the queue holds
    fn capacity(&self) -> usize;
}

/// Shared handle to a queue primitive
pub type QueueHandle<T> = Arc<dyn RtosQueue<T>>;

/// Default queue built on a bounded crossbeam channel
pub struct BoundedQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = channel::bounded(capacity);
        Self { tx, rx, capacity }
    }
}

impl<T: Send> RtosQueue<T> for BoundedQueue<T> {
    fn send(&self, item: T, timeout: Timeout) -> Result<(), T> {
        match timeout.as_duration() {
            None => self.tx.send(item).map_err(|e| e.into_inner()),
            Some(bound) => self.tx.send_timeout(item, bound).map_err(|e| e.into_inner()),
        }
    }

    fn receive(&self, timeout: Timeout) -> Option<T> {
        match timeout.as_duration() {
            None => self.rx.recv().ok(),
            Some(bound) => self.rx.recv_timeout(bound).ok(),
        }
    }

    fn depth(&self) -> usize {
        self.rx.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("depth", &self.rx.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Create a queue of `length` elements
///
/// Lengths outside `(0, MAX_QUEUE_CAPACITY]` are rejected.
pub fn create_queue<T: Send + 'static>(length: u8) -> FrtResult<QueueHandle<T>> {
    if let Err(e) = check_capacity(length, MAX_QUEUE_CAPACITY) {
        log::warn!("Supplied length of the queue is not valid [either too small or too big]");
        return Err(e);
    }

    Ok(Arc::new(BoundedQueue::new(usize::from(length))))
}
