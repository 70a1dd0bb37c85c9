//! # Buffered channels between cooperating tasks
//!
//! A [`Transceiver`] belongs to one task and talks to a small, fixed set of
//! partner tasks. Each partner has:
//!
//! - a lock shared with the partner's own transceiver
//! - an rx queue (envelopes arriving) and a tx queue (envelopes leaving), either
//!   of which may be absent for one-directional channels
//! - a staging buffer of caller-owned objects built from received envelopes
//!
//! ## Send / receive protocol
//!
//! Both paths validate their two timeouts before touching any primitive, take
//! the partner lock with the lock timeout, perform exactly one queue
//! operation with the queue timeout, and release the lock on every exit.
//!
//! ```rust
//! use frt_core::rtos::{create_mutex, create_queue, TaskHandle, WAIT_FOREVER};
//! use frt_core::transceiver::{Envelope, Transceiver};
//!
//! let me = TaskHandle::from_raw(1);
//! let peer = TaskHandle::from_raw(2);
//! let lock = create_mutex();
//! let to_peer = create_queue::<Envelope<u32>>(4).unwrap();
//! let to_me = create_queue::<Envelope<u32>>(4).unwrap();
//!
//! let mut mine: Transceiver<u32, u32> = Transceiver::new(2);
//! mine.add_data_allocate_callback(|env: &Envelope<u32>| env.data);
//! mine.add_data_free_callback(|_: u32| {});
//! mine.add_comm_partner(peer, Some(lock.clone()), Some(to_me.clone()), 4, Some(to_peer.clone()), 4, "peer")
//!     .unwrap();
//!
//! let mut theirs: Transceiver<u32, u32> = Transceiver::new(2);
//! theirs.add_data_allocate_callback(|env: &Envelope<u32>| env.data * 10);
//! theirs.add_data_free_callback(|_: u32| {});
//! theirs.add_comm_partner(me, Some(lock), Some(to_peer), 4, Some(to_me), 4, "me")
//!     .unwrap();
//!
//! mine.write_to_queue(peer, 0, 7, 10, WAIT_FOREVER, 0).unwrap();
//! theirs.read_from_queue(me, 10, WAIT_FOREVER).unwrap();
//! assert_eq!(theirs.get_newest_buffered_data_from(me), Some(&70));
//! ```
//!
//! Accessors take `&self` and receives take `&mut self`, so a staged object
//! can never be read while a receive on the same transceiver reshuffles the
//! buffer.

use crate::config::TransceiverConfig;
use crate::error::{Direction, FrtError, FrtResult};
use crate::rtos::{check_capacity, LockGuard, MutexHandle, QueueHandle, TaskHandle, Timeout};

pub mod envelope;
pub mod metrics;
pub mod partner;
pub mod staging;

pub use envelope::{AdditionalData, Envelope};
pub use metrics::{AtomicTransceiverMetrics, TransceiverMetrics};
pub use partner::CommPartner;
pub use staging::StagingBuffer;

/// Builds a staged object from a received envelope
pub type AllocateFn<D, S> = Box<dyn Fn(&Envelope<D>) -> S + Send + Sync>;

/// Releases a staged object
pub type FreeFn<S> = Box<dyn Fn(S) + Send + Sync>;

/// Message exchange with a fixed set of partner tasks
///
/// `D` is the payload reference carried in each [`Envelope`], `S` the
/// caller-defined object staged on receipt.
pub struct Transceiver<D, S> {
    config: TransceiverConfig,
    partners: Vec<CommPartner<D, S>>,
    allocator: Option<AllocateFn<D, S>>,
    destroyer: Option<FreeFn<S>>,
    metrics: AtomicTransceiverMetrics,
}

impl<D, S> Transceiver<D, S> {
    /// Create a transceiver with room for `max_partners` partners
    pub fn new(max_partners: u8) -> Self {
        Self::build(TransceiverConfig::with_max_partners(max_partners))
    }

    /// Create a transceiver from a validated configuration
    pub fn with_config(config: TransceiverConfig) -> FrtResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: TransceiverConfig) -> Self {
        Self {
            partners: Vec::with_capacity(usize::from(config.max_partners)),
            config,
            allocator: None,
            destroyer: None,
            metrics: AtomicTransceiverMetrics::default(),
        }
    }

    // ---------------------------------------------------------------------
    // Partner registry
    // ---------------------------------------------------------------------

    /// Register a partner task.
    ///
    /// Fails when the table is full, the identity is null or already known,
    /// or no lock is supplied. Either queue may be `None`, which disables
    /// that direction only.
    #[allow(clippy::too_many_arguments)]
    pub fn add_comm_partner(
        &mut self,
        partner: TaskHandle,
        lock: Option<MutexHandle>,
        rx_queue: Option<QueueHandle<Envelope<D>>>,
        rx_capacity: u8,
        tx_queue: Option<QueueHandle<Envelope<D>>>,
        tx_capacity: u8,
        name: &str,
    ) -> FrtResult<()> {
        if self.partners.len() >= usize::from(self.config.max_partners) {
            return Err(FrtError::RegistryFull {
                max: self.config.max_partners,
            });
        }
        if partner.is_null() {
            return Err(FrtError::InvalidTask);
        }
        let lock = lock.ok_or(FrtError::MissingLock(partner))?;
        if self.position(partner).is_some() {
            return Err(FrtError::AlreadyRegistered(partner));
        }

        let mut record = CommPartner::new(partner, lock, name);
        if let Some(queue) = rx_queue {
            record.bind_queue(Direction::Rx, queue, rx_capacity);
        }
        if let Some(queue) = tx_queue {
            record.bind_queue(Direction::Tx, queue, tx_capacity);
        }

        log::info!(
            "Registered partner '{}' ({}): rx={} tx={}",
            name,
            partner,
            record.rx_queue.is_some(),
            record.tx_queue.is_some()
        );
        self.partners.push(record);
        Ok(())
    }

    /// Attach or replace the rx or tx queue of an already registered partner.
    ///
    /// Shrinking the rx length below the number of staged objects destroys
    /// the oldest ones until the staging buffer fits again.
    pub fn add_comm_queue(
        &mut self,
        partner: TaskHandle,
        queue: QueueHandle<Envelope<D>>,
        capacity: u8,
        direction: Direction,
    ) -> FrtResult<()> {
        let pos = self.lookup(partner)?;
        let record = &mut self.partners[pos];
        record.bind_queue(direction, queue, capacity);
        log::debug!("Bound {} queue (length {}) for {}", direction, capacity, partner);

        if direction == Direction::Rx && capacity > 0 {
            if let Some(destroy) = self.destroyer.as_ref() {
                while record.staging.len() > usize::from(capacity) {
                    let Some(oldest) = record.staging.pop_oldest() else {
                        break;
                    };
                    destroy(oldest);
                    AtomicTransceiverMetrics::record(&self.metrics.evictions);
                }
            }
        }
        Ok(())
    }

    fn position(&self, partner: TaskHandle) -> Option<usize> {
        if partner.is_null() {
            return None;
        }
        self.partners.iter().position(|p| p.task == partner)
    }

    fn lookup(&self, partner: TaskHandle) -> FrtResult<usize> {
        self.position(partner)
            .ok_or(FrtError::UnknownPartner(partner))
    }

    fn partner(&self, partner: TaskHandle) -> Option<&CommPartner<D, S>> {
        self.position(partner).map(|pos| &self.partners[pos])
    }

    /// Display name supplied at registration
    pub fn get_partners_name(&self, partner: TaskHandle) -> Option<&str> {
        self.partner(partner).map(CommPartner::name)
    }

    /// Number of registered partners
    pub fn partner_count(&self) -> usize {
        self.partners.len()
    }

    /// Size of the partner table
    pub fn max_partners(&self) -> u8 {
        self.config.max_partners
    }

    /// Registered partners with their display names, in registration order
    pub fn partners(&self) -> impl Iterator<Item = (TaskHandle, &str)> {
        self.partners.iter().map(|p| (p.task(), p.name()))
    }

    // ---------------------------------------------------------------------
    // Data interpreters
    // ---------------------------------------------------------------------

    /// Install the callback that turns a received envelope into a staged object
    pub fn add_data_allocate_callback<F>(&mut self, allocate: F)
    where
        F: Fn(&Envelope<D>) -> S + Send + Sync + 'static,
    {
        self.allocator = Some(Box::new(allocate));
    }

    /// Install the callback that releases a staged object
    pub fn add_data_free_callback<F>(&mut self, free: F)
    where
        F: Fn(S) + Send + Sync + 'static,
    {
        self.destroyer = Some(Box::new(free));
    }

    /// Sending and receiving stay disabled until both callbacks are installed
    pub fn has_data_interpreters(&self) -> bool {
        self.allocator.is_some() && self.destroyer.is_some()
    }

    // ---------------------------------------------------------------------
    // Send path
    // ---------------------------------------------------------------------

    /// Send one message to `destination`.
    ///
    /// `lock_timeout_ms` bounds the wait for the partner lock and
    /// `write_timeout_ms` the enqueue itself; each is a millisecond bound or
    /// [`WAIT_FOREVER`](crate::rtos::WAIT_FOREVER). A tx queue already holding
    /// its declared number of envelopes fails at once without waiting.
    pub fn write_to_queue(
        &mut self,
        destination: TaskHandle,
        data_type: u8,
        data: D,
        write_timeout_ms: i32,
        lock_timeout_ms: i32,
        additional_data: AdditionalData,
    ) -> FrtResult<()> {
        let result = self.send_envelope(
            destination,
            data_type,
            data,
            write_timeout_ms,
            lock_timeout_ms,
            additional_data,
        );

        match &result {
            Ok(()) => AtomicTransceiverMetrics::record(&self.metrics.messages_sent),
            Err(e) => {
                AtomicTransceiverMetrics::record(&self.metrics.send_failures);
                log::debug!("Send to {} failed: {}", destination, e);
            }
        }
        result
    }

    fn send_envelope(
        &mut self,
        destination: TaskHandle,
        data_type: u8,
        data: D,
        write_timeout_ms: i32,
        lock_timeout_ms: i32,
        additional_data: AdditionalData,
    ) -> FrtResult<()> {
        if !self.has_data_interpreters() {
            log::warn!("Not allowed to write to a queue [no callbacks for allocating/freeing data supplied]");
            return Err(FrtError::NoDataInterpreters);
        }
        let pos = self.lookup(destination).map_err(|e| {
            log::warn!("Not allowed to write to a queue [destination task unknown]");
            e
        })?;

        let max_capacity = self.config.max_queue_capacity;
        let partner = &self.partners[pos];
        let tx_queue = match &partner.tx_queue {
            Some(queue) => queue.clone(),
            None => {
                log::warn!("Action not allowed [no tx queue supplied]");
                return Err(FrtError::MissingQueue {
                    partner: destination,
                    direction: Direction::Tx,
                });
            }
        };
        check_capacity(partner.tx_capacity, max_capacity).map_err(|e| {
            log::warn!("Action not allowed [queue length invalid]");
            e
        })?;

        let lock_timeout = Timeout::validate(lock_timeout_ms)?;
        let write_timeout = Timeout::validate(write_timeout_ms)?;

        let _guard = LockGuard::acquire(partner.lock.clone(), lock_timeout)
            .ok_or(FrtError::LockTimeout(destination))?;

        if tx_queue.depth() >= usize::from(partner.tx_capacity) {
            return Err(FrtError::QueueFull(destination));
        }

        tx_queue
            .send(Envelope::new(data, data_type, additional_data), write_timeout)
            .map_err(|_| FrtError::QueueTimeout(destination))
    }

    // ---------------------------------------------------------------------
    // Receive path
    // ---------------------------------------------------------------------

    /// Receive one message from `source` into its staging buffer.
    ///
    /// When the staging buffer is already full the oldest object is destroyed
    /// first. That eviction stands even if no message then arrives within
    /// `read_timeout_ms`, so a failed receive may leave one object fewer.
    pub fn read_from_queue(
        &mut self,
        source: TaskHandle,
        read_timeout_ms: i32,
        lock_timeout_ms: i32,
    ) -> FrtResult<()> {
        let result = self.receive_envelope(source, read_timeout_ms, lock_timeout_ms);

        match &result {
            Ok(()) => AtomicTransceiverMetrics::record(&self.metrics.messages_received),
            Err(e) => {
                AtomicTransceiverMetrics::record(&self.metrics.recv_failures);
                log::debug!("Receive from {} failed: {}", source, e);
            }
        }
        result
    }

    fn receive_envelope(
        &mut self,
        source: TaskHandle,
        read_timeout_ms: i32,
        lock_timeout_ms: i32,
    ) -> FrtResult<()> {
        let (allocate, destroy) = match (&self.allocator, &self.destroyer) {
            (Some(allocate), Some(destroy)) => (allocate, destroy),
            _ => return Err(FrtError::NoDataInterpreters),
        };
        let pos = self.lookup(source)?;

        let partner = &mut self.partners[pos];
        let rx_queue = partner.rx_queue.clone().ok_or(FrtError::MissingQueue {
            partner: source,
            direction: Direction::Rx,
        })?;
        check_capacity(partner.rx_capacity, self.config.max_queue_capacity)?;

        let lock_timeout = Timeout::validate(lock_timeout_ms)?;
        let read_timeout = Timeout::validate(read_timeout_ms)?;

        let _guard = LockGuard::acquire(partner.lock.clone(), lock_timeout)
            .ok_or(FrtError::LockTimeout(source))?;

        if partner.rx_buffer_full() {
            if let Some(oldest) = partner.staging.pop_oldest() {
                destroy(oldest);
                AtomicTransceiverMetrics::record(&self.metrics.evictions);
                log::trace!("Evicted oldest staged object from '{}'", partner.name);
            }
        }

        let envelope = rx_queue
            .receive(read_timeout)
            .ok_or(FrtError::QueueEmpty(source))?;

        partner.staging.push(allocate(&envelope));
        log::trace!(
            "Staged message type {} from '{}' ({} staged)",
            envelope.data_type,
            partner.name,
            partner.staging.len()
        );
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Staging buffer access
    // ---------------------------------------------------------------------

    /// Most recently staged object from `partner`
    pub fn get_newest_buffered_data_from(&self, partner: TaskHandle) -> Option<&S> {
        self.partner(partner)?.staging.newest()
    }

    /// Oldest staged object from `partner`
    pub fn get_oldest_buffered_data_from(&self, partner: TaskHandle) -> Option<&S> {
        self.partner(partner)?.staging.oldest()
    }

    /// Staged object at `index` (0 is the oldest)
    pub fn get_buffered_data_from(&self, partner: TaskHandle, index: usize) -> Option<&S> {
        self.partner(partner)?.staging.get(index)
    }

    /// Destroy the oldest staged object from `partner`.
    ///
    /// The remaining objects move down one position. Returns whether an
    /// object was destroyed.
    pub fn manual_delete_allocated_data(&mut self, partner: TaskHandle) -> bool {
        let Some(pos) = self.position(partner) else {
            return false;
        };
        let Some(destroy) = self.destroyer.as_ref() else {
            return false;
        };

        match self.partners[pos].staging.pop_oldest() {
            Some(oldest) => {
                log::debug!("Manually deleting allocated data from {}", partner);
                destroy(oldest);
                true
            }
            None => false,
        }
    }

    /// Destroy every staged object from `partner`, returning how many were destroyed
    pub fn manual_delete_all_allocated_data_for_line(&mut self, partner: TaskHandle) -> usize {
        let Some(pos) = self.position(partner) else {
            return 0;
        };
        let Some(destroy) = self.destroyer.as_ref() else {
            return 0;
        };

        let mut destroyed = 0;
        for staged in self.partners[pos].staging.drain() {
            destroy(staged);
            destroyed += 1;
        }
        destroyed
    }

    // ---------------------------------------------------------------------
    // Diagnostics
    // ---------------------------------------------------------------------

    /// Envelopes waiting in the rx queue of `partner` (not yet staged)
    pub fn messages_on_queue(&self, partner: TaskHandle) -> Option<usize> {
        self.partner(partner)?
            .rx_queue
            .as_ref()
            .map(|queue| queue.depth())
    }

    /// True when the rx queue of `partner` holds at least one envelope
    pub fn has_messages_from(&self, partner: TaskHandle) -> bool {
        self.messages_on_queue(partner).is_some_and(|depth| depth > 0)
    }

    /// True when at least one object from `partner` is staged
    pub fn has_data_from(&self, partner: TaskHandle) -> bool {
        self.partner(partner)
            .is_some_and(|p| p.staging.has_buffered_data())
    }

    /// True when the staging buffer of `partner` is at its rx capacity
    pub fn rx_buffer_full(&self, partner: TaskHandle) -> bool {
        self.partner(partner).is_some_and(CommPartner::rx_buffer_full)
    }

    /// Staged objects summed over every partner
    pub fn amount_of_data_in_all_buffers(&self) -> usize {
        self.partners.iter().map(|p| p.staging.len()).sum()
    }

    /// Current counter values
    pub fn metrics(&self) -> TransceiverMetrics {
        self.metrics.snapshot()
    }
}

impl<D, S> Drop for Transceiver<D, S> {
    fn drop(&mut self) {
        let Some(destroy) = self.destroyer.as_ref() else {
            return;
        };
        for partner in &mut self.partners {
            for staged in partner.staging.drain() {
                destroy(staged);
            }
        }
    }
}

impl<D, S> std::fmt::Debug for Transceiver<D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transceiver")
            .field("config", &self.config)
            .field("partners", &self.partners.len())
            .field("has_data_interpreters", &self.has_data_interpreters())
            .finish_non_exhaustive()
    }
}
