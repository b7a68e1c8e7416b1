//! Drop accounting
//!
//! Every overload condition on the link is resolved by discarding data.
//! The counters here make those drops observable to a diagnostic task
//! without feeding anything back into the data path.

use portable_atomic::{AtomicU32, Ordering};

/// Byte counts past `u32::MAX` in one event are recorded as `u32::MAX`
fn saturate(bytes: usize) -> u32 {
    u32::try_from(bytes).unwrap_or(u32::MAX)
}

/// Link-wide counters, updated from both execution contexts
///
/// Counters wrap on overflow; [`StatsSnapshot::since`] uses wrapping
/// differences, so interval deltas stay correct across a wrap.
#[derive(Debug, Default)]
pub struct LinkStats {
    lines_committed: AtomicU32,
    lines_dropped: AtomicU32,
    rx_bytes_truncated: AtomicU32,
    tx_bytes_dropped: AtomicU32,
    tx_bytes_lost: AtomicU32,
}

/// Point-in-time copy of [`LinkStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsSnapshot {
    /// Lines handed to the transfer queue
    pub lines_committed: u32,
    /// Lines discarded because the transfer queue was full
    pub lines_dropped: u32,
    /// Bytes discarded because the line buffer was full
    pub rx_bytes_truncated: u32,
    /// Output bytes discarded because the output ring was full
    pub tx_bytes_dropped: u32,
    /// Output bytes the transmit FIFO did not accept
    pub tx_bytes_lost: u32,
}

impl StatsSnapshot {
    /// Counter increments between `earlier` and `self`
    pub fn since(&self, earlier: &StatsSnapshot) -> StatsSnapshot {
        StatsSnapshot {
            lines_committed: self.lines_committed.wrapping_sub(earlier.lines_committed),
            lines_dropped: self.lines_dropped.wrapping_sub(earlier.lines_dropped),
            rx_bytes_truncated: self.rx_bytes_truncated.wrapping_sub(earlier.rx_bytes_truncated),
            tx_bytes_dropped: self.tx_bytes_dropped.wrapping_sub(earlier.tx_bytes_dropped),
            tx_bytes_lost: self.tx_bytes_lost.wrapping_sub(earlier.tx_bytes_lost),
        }
    }

    /// Check if any drop counter is non-zero
    pub fn has_drops(&self) -> bool {
        self.lines_dropped != 0
            || self.rx_bytes_truncated != 0
            || self.tx_bytes_dropped != 0
            || self.tx_bytes_lost != 0
    }
}

impl LinkStats {
    /// Create zeroed counters
    pub const fn new() -> Self {
        Self {
            lines_committed: AtomicU32::new(0),
            lines_dropped: AtomicU32::new(0),
            rx_bytes_truncated: AtomicU32::new(0),
            tx_bytes_dropped: AtomicU32::new(0),
            tx_bytes_lost: AtomicU32::new(0),
        }
    }

    pub(crate) fn record_committed(&self) {
        self.lines_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_line_dropped(&self) {
        self.lines_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_truncated(&self) {
        self.rx_bytes_truncated.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_tx_dropped(&self, bytes: usize) {
        self.tx_bytes_dropped.fetch_add(saturate(bytes), Ordering::Relaxed);
    }

    pub(crate) fn record_tx_lost(&self, bytes: usize) {
        self.tx_bytes_lost.fetch_add(saturate(bytes), Ordering::Relaxed);
    }

    /// Read all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lines_committed: self.lines_committed.load(Ordering::Relaxed),
            lines_dropped: self.lines_dropped.load(Ordering::Relaxed),
            rx_bytes_truncated: self.rx_bytes_truncated.load(Ordering::Relaxed),
            tx_bytes_dropped: self.tx_bytes_dropped.load(Ordering::Relaxed),
            tx_bytes_lost: self.tx_bytes_lost.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let stats = LinkStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
        assert!(!stats.snapshot().has_drops());
    }

    #[test]
    fn test_committed_lines_are_not_drops() {
        let stats = LinkStats::new();
        stats.record_committed();
        stats.record_committed();

        let snap = stats.snapshot();
        assert_eq!(snap.lines_committed, 2);
        assert!(!snap.has_drops());
    }

    #[test]
    fn test_since_reports_increments() {
        let stats = LinkStats::new();
        stats.record_tx_dropped(10);
        let before = stats.snapshot();

        stats.record_tx_dropped(5);
        stats.record_tx_lost(3);
        stats.record_line_dropped();

        let delta = stats.snapshot().since(&before);
        assert_eq!(delta.tx_bytes_dropped, 5);
        assert_eq!(delta.tx_bytes_lost, 3);
        assert_eq!(delta.lines_dropped, 1);
        assert_eq!(delta.rx_bytes_truncated, 0);
        assert!(delta.has_drops());
    }

    #[test]
    fn test_oversized_byte_count_saturates() {
        let stats = LinkStats::new();
        stats.record_tx_lost(usize::MAX);
        assert_eq!(stats.snapshot().tx_bytes_lost, u32::MAX);
    }

    #[test]
    fn test_since_survives_wraparound() {
        let earlier = StatsSnapshot {
            tx_bytes_dropped: u32::MAX,
            ..Default::default()
        };
        let later = StatsSnapshot {
            tx_bytes_dropped: 4,
            ..Default::default()
        };
        assert_eq!(later.since(&earlier).tx_bytes_dropped, 5);
    }
}
