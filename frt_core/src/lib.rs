//! # FRT Core
//!
//! Inter-task messaging for cooperating tasks on a single real-time host.
//!
//! A task owns one [`Transceiver`] and registers the partner tasks it talks
//! to. Every partner channel is made of:
//!
//! - **a lock** shared by both ends, serializing sends and receives
//! - **bounded queues**, one per direction, carrying fixed-layout [`Envelope`]s
//! - **a staging buffer** of caller-owned objects built from received envelopes,
//!   bounded by the rx queue length with oldest-first eviction
//!
//! Lock acquisition and the queue operation each take their own timeout, so a
//! call never blocks longer than the caller asked for.
//!
//! ## Modules
//!
//! - [`rtos`]: task identity, timeouts and the lock/queue primitives
//! - [`transceiver`]: partner registry, send/receive paths and buffer access
//! - [`config`]: transceiver sizing loaded from TOML/YAML
//! - [`error`]: [`FrtError`] and [`FrtResult`]

pub mod config;
pub mod error;
pub mod rtos;
pub mod transceiver;

// Re-export commonly used types for easy access
pub use config::TransceiverConfig;
pub use error::{Direction, FrtError, FrtResult};
pub use rtos::{create_mutex, create_queue, TaskHandle, Timeout, WAIT_FOREVER};
pub use transceiver::{AdditionalData, Envelope, Transceiver, TransceiverMetrics};
