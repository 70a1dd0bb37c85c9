use super::envelope::Envelope;
use super::staging::StagingBuffer;
use crate::error::Direction;
use crate::rtos::{MutexHandle, QueueHandle, TaskHandle};

/// Communication state kept for one registered partner task
pub struct CommPartner<D, S> {
    pub(crate) task: TaskHandle,
    pub(crate) lock: MutexHandle,
    pub(crate) rx_queue: Option<QueueHandle<Envelope<D>>>,
    pub(crate) rx_capacity: u8,
    pub(crate) tx_queue: Option<QueueHandle<Envelope<D>>>,
    pub(crate) tx_capacity: u8,
    pub(crate) staging: StagingBuffer<S>,
    pub(crate) name: String,
}

impl<D, S> CommPartner<D, S> {
    pub(crate) fn new(task: TaskHandle, lock: MutexHandle, name: &str) -> Self {
        Self {
            task,
            lock,
            rx_queue: None,
            rx_capacity: 0,
            tx_queue: None,
            tx_capacity: 0,
            staging: StagingBuffer::new(),
            name: name.to_string(),
        }
    }

    /// (Re)bind the queue for one direction together with its declared length
    pub(crate) fn bind_queue(
        &mut self,
        direction: Direction,
        queue: QueueHandle<Envelope<D>>,
        capacity: u8,
    ) {
        match direction {
            Direction::Rx => {
                self.rx_queue = Some(queue);
                self.rx_capacity = capacity;
            }
            Direction::Tx => {
                self.tx_queue = Some(queue);
                self.tx_capacity = capacity;
            }
        }
    }

    pub fn task(&self) -> TaskHandle {
        self.task
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once the staging buffer holds `rx_capacity` objects
    pub fn rx_buffer_full(&self) -> bool {
        self.rx_capacity > 0 && self.staging.is_full(usize::from(self.rx_capacity))
    }
}
