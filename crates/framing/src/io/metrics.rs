/// Byte counter of one direction of a transport.
///
/// Only ever incremented; [`reset`](Self::reset) is an explicit
/// connection-level operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportMetrics {
    bytes_transferred: u64,
}

impl TransportMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }

    #[inline]
    pub fn increment_bytes_transferred(&mut self, count: u64) {
        self.bytes_transferred = self.bytes_transferred.saturating_add(count);
    }

    pub fn reset(&mut self) {
        self.bytes_transferred = 0;
    }
}

/// Snapshot of a connection's traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionMetrics {
    pub request_count: u64,
    pub response_count: u64,
    pub received_bytes: u64,
    pub sent_bytes: u64,
}
