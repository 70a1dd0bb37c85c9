// RTOS primitive layer consumed by the transceiver
//
// The transceiver never talks to a scheduler directly. It needs:
// - an opaque task identity to key partners by
// - a lock with try-with-timeout semantics
// - a bounded FIFO with send/receive timeouts and a depth query
//
// Default implementations on top of std threads are provided so the crate is
// usable on a hosted RT-Linux style target; embedded targets plug their own
// primitives in through the traits.

use crate::error::{FrtError, FrtResult};
use std::fmt;
use std::time::Duration;

pub mod queue;
pub mod sync;

pub use queue::{create_queue, BoundedQueue, QueueHandle, RtosQueue};
pub use sync::{create_mutex, LockGuard, MutexHandle, RtosMutex, TimedMutex};

/// Raw timeout value meaning "block until the operation completes"
pub const WAIT_FOREVER: i32 = -1;

/// Upper bound for any declared queue length
pub const MAX_QUEUE_CAPACITY: u8 = 32;

/// Task handle identifying a task on the host
///
/// Only equality matters to the transceiver. Id `0` is reserved as the
/// "no task" value and is never a valid partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle {
    pub id: usize,
}

impl TaskHandle {
    /// The reserved "no identity" handle
    pub const NULL: TaskHandle = TaskHandle { id: 0 };

    /// Wrap a scheduler-supplied identifier
    pub const fn from_raw(id: usize) -> Self {
        Self { id }
    }

    /// Handle for the calling OS thread
    pub fn current() -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        std::thread::current().id().hash(&mut hasher);

        // Keep clear of the reserved null id
        let id = (hasher.finish() as usize).max(1);
        Self { id }
    }

    pub fn is_null(&self) -> bool {
        self.id == 0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.id)
    }
}

/// A validated blocking bound for a lock or queue operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Block indefinitely
    WaitForever,
    /// Block for at most this many milliseconds (`0` polls)
    Millis(u32),
}

impl Timeout {
    /// Validate a raw millisecond value.
    ///
    /// Accepts any non-negative bound and the [`WAIT_FOREVER`] sentinel; every
    /// other negative value is rejected without side effects.
    pub fn validate(raw_ms: i32) -> FrtResult<Self> {
        match raw_ms {
            WAIT_FOREVER => Ok(Timeout::WaitForever),
            ms if ms >= 0 => Ok(Timeout::Millis(ms as u32)),
            invalid => {
                log::warn!("Nothing sent [invalid wait time {} ms specified]", invalid);
                Err(FrtError::InvalidTimeout(invalid))
            }
        }
    }

    /// Translate to the primitive's duration representation
    ///
    /// `None` means wait without a bound.
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Timeout::WaitForever => None,
            Timeout::Millis(ms) => Some(Duration::from_millis(u64::from(*ms))),
        }
    }
}

/// Check a declared queue length against `(0, max]`
pub(crate) fn check_capacity(capacity: u8, max: u8) -> FrtResult<()> {
    if capacity == 0 || capacity > max {
        return Err(FrtError::InvalidCapacity { capacity, max });
    }
    Ok(())
}
