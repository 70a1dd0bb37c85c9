// RTOS synchronization primitives

use super::Timeout;
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Lock shared between the two ends of a partner channel
///
/// Semantics follow an RTOS mutex rather than `std::sync::Mutex`: the lock
/// guards no data of its own, acquisition takes a timeout, and release is an
/// explicit call.
pub trait RtosMutex: Send + Sync {
    /// Take the lock, blocking at most `timeout`. Returns false on expiry.
    fn acquire(&self, timeout: Timeout) -> bool;

    /// Give the lock back
    fn release(&self);

    /// Check if the lock is currently held
    fn is_locked(&self) -> bool;
}

/// Shared handle to a lock primitive
pub type MutexHandle = Arc<dyn RtosMutex>;

/// Default lock built on a parking_lot mutex/condvar pair
#[derive(Default)]
pub struct TimedMutex {
    locked: Mutex<bool>,
    available: Condvar,
}

impl TimedMutex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RtosMutex for TimedMutex {
    fn acquire(&self, timeout: Timeout) -> bool {
        let mut locked = self.locked.lock();

        match timeout.as_duration() {
            None => {
                while *locked {
                    self.available.wait(&mut locked);
                }
            }
            Some(bound) => {
                let deadline = Instant::now() + bound;
                while *locked {
                    if self.available.wait_until(&mut locked, deadline).timed_out() && *locked {
                        return false;
                    }
                }
            }
        }

        *locked = true;
        true
    }

    fn release(&self) {
        let mut locked = self.locked.lock();
        *locked = false;
        drop(locked);
        self.available.notify_one();
    }

    fn is_locked(&self) -> bool {
        *self.locked.lock()
    }
}

impl fmt::Debug for TimedMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedMutex")
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// Create a lock for a partner channel
pub fn create_mutex() -> MutexHandle {
    Arc::new(TimedMutex::new())
}

/// Holds an acquired lock and gives it back on drop
///
/// Every exit path of a send or receive, early returns included, releases
/// the partner lock through this guard.
pub struct LockGuard {
    lock: MutexHandle,
}

impl LockGuard {
    /// Acquire `lock` within `timeout`, or `None` if it stayed taken
    pub fn acquire(lock: MutexHandle, timeout: Timeout) -> Option<Self> {
        if lock.acquire(timeout) {
            Some(Self { lock })
        } else {
            None
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.lock.release();
    }
}
