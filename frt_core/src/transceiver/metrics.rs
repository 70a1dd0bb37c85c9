use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters for transceiver monitoring
#[derive(Debug, Default)]
pub struct AtomicTransceiverMetrics {
    pub messages_sent: AtomicU64,
    pub messages_received: AtomicU64,
    pub send_failures: AtomicU64,
    pub recv_failures: AtomicU64,
    pub evictions: AtomicU64,
}

impl AtomicTransceiverMetrics {
    pub(crate) fn record(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot (for monitoring/debugging)
    pub fn snapshot(&self) -> TransceiverMetrics {
        TransceiverMetrics {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            recv_failures: self.recv_failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the transceiver counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransceiverMetrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub send_failures: u64,
    pub recv_failures: u64,
    /// Staged objects destroyed to make room for a newer one
    pub evictions: u64,
}
