//! Receive-side staging buffer
//!
//! Holds the caller-owned objects built from received envelopes, oldest at
//! index 0. The buffer never grows past its capacity: the receive path evicts
//! the oldest entry before staging into a full buffer, and shrinking the rx
//! length trims the oldest entries first.

use std::collections::VecDeque;

#[derive(Debug)]
pub struct StagingBuffer<S> {
    entries: VecDeque<S>,
}

impl<S> Default for StagingBuffer<S> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<S> StagingBuffer<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True iff at least one staged object is present
    pub fn has_buffered_data(&self) -> bool {
        !self.entries.is_empty()
    }

    /// True once occupancy has reached `capacity`
    pub fn is_full(&self, capacity: usize) -> bool {
        self.entries.len() >= capacity
    }

    pub fn newest(&self) -> Option<&S> {
        self.entries.back()
    }

    pub fn oldest(&self) -> Option<&S> {
        self.entries.front()
    }

    pub fn get(&self, index: usize) -> Option<&S> {
        self.entries.get(index)
    }

    /// Stage a new object as the newest entry
    pub fn push(&mut self, staged: S) {
        self.entries.push_back(staged);
    }

    /// Remove the oldest entry; the remaining entries move down one slot
    pub fn pop_oldest(&mut self) -> Option<S> {
        self.entries.pop_front()
    }

    /// Remove every entry, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = S> + '_ {
        self.entries.drain(..)
    }
}
