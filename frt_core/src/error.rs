//! Unified error handling for the transceiver
//!
//! Every failure of a registration, send or receive call is reported through
//! [`FrtError`]. Nothing in the crate panics on a documented failure path, so
//! callers are expected to inspect every returned result.

use crate::rtos::TaskHandle;
use std::fmt;
use thiserror::Error;

/// Direction of a partner queue, as seen from the owning transceiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Envelopes arriving from the partner
    Rx,
    /// Envelopes travelling to the partner
    Tx,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Rx => write!(f, "rx"),
            Direction::Tx => write!(f, "tx"),
        }
    }
}

/// Main error type for transceiver operations
#[derive(Debug, Error)]
pub enum FrtError {
    /// The partner table already holds its configured maximum
    #[error("Partner registry full ({max} partners)")]
    RegistryFull { max: u8 },

    /// The reserved null task identity was supplied
    #[error("Invalid task identity")]
    InvalidTask,

    /// A partner cannot be registered without a lock
    #[error("No lock supplied for partner {0}")]
    MissingLock(TaskHandle),

    /// The task identity is not a registered partner
    #[error("Unknown partner {0}")]
    UnknownPartner(TaskHandle),

    /// The task identity is already registered
    #[error("Partner {0} already registered")]
    AlreadyRegistered(TaskHandle),

    /// Allocate and destroy callbacks are not both installed
    #[error("No data interpreters installed (allocate and free callbacks required)")]
    NoDataInterpreters,

    /// The partner has no queue bound for the requested direction
    #[error("Partner {partner} has no {direction} queue")]
    MissingQueue {
        partner: TaskHandle,
        direction: Direction,
    },

    /// A declared queue length lies outside `(0, max]`
    #[error("Invalid queue capacity {capacity} (allowed 1..={max})")]
    InvalidCapacity { capacity: u8, max: u8 },

    /// A timeout other than a non-negative bound or the wait-forever sentinel
    #[error("Invalid wait time {0} ms")]
    InvalidTimeout(i32),

    /// The partner lock was not available before the lock timeout elapsed
    #[error("Lock for partner {0} not acquired before timeout")]
    LockTimeout(TaskHandle),

    /// The tx queue already holds its declared number of envelopes
    #[error("Tx queue to partner {0} is full")]
    QueueFull(TaskHandle),

    /// The enqueue did not complete before the write timeout elapsed
    #[error("Write to partner {0} timed out")]
    QueueTimeout(TaskHandle),

    /// No envelope arrived before the read timeout elapsed
    #[error("No message from partner {0} before timeout")]
    QueueEmpty(TaskHandle),

    /// Configuration parsing or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrtError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        FrtError::Config(msg.into())
    }

    /// Unregistered partner, missing queue or lock, callbacks not installed,
    /// invalid capacity
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FrtError::InvalidTask
                | FrtError::MissingLock(_)
                | FrtError::UnknownPartner(_)
                | FrtError::AlreadyRegistered(_)
                | FrtError::NoDataInterpreters
                | FrtError::MissingQueue { .. }
                | FrtError::InvalidCapacity { .. }
                | FrtError::Config(_)
        )
    }

    /// Invalid timeout value, lock timeout or queue-operation timeout
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FrtError::InvalidTimeout(_)
                | FrtError::LockTimeout(_)
                | FrtError::QueueTimeout(_)
                | FrtError::QueueEmpty(_)
        )
    }

    /// Registry full or tx queue full
    pub fn is_capacity(&self) -> bool {
        matches!(self, FrtError::RegistryFull { .. } | FrtError::QueueFull(_))
    }
}

impl From<toml::de::Error> for FrtError {
    fn from(err: toml::de::Error) -> Self {
        FrtError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<serde_yaml::Error> for FrtError {
    fn from(err: serde_yaml::Error) -> Self {
        FrtError::Config(format!("YAML parse error: {}", err))
    }
}

/// Convenience type alias for Results using FrtError
pub type FrtResult<T> = std::result::Result<T, FrtError>;
