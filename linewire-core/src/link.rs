//! The shared link context
//!
//! [`Link`] bundles every resource the two execution contexts share. It
//! is built once with [`Link::new`] (usable in a `static`) and handed by
//! reference to both the UART interrupt handler and the application task:
//!
//! - interrupt context: [`Link::on_rx_byte`], [`Link::on_tx_interrupt`]
//! - thread context: [`Link::next_line`], [`Link::submit`]

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use linewire_hal::{UartTxFifo, UartTxIrq};

use crate::drainer::{DrainOutcome, Submitted, TransmitDrainer};
use crate::line::{Accumulate, Line, LineAccumulator};
use crate::queue::TransferQueue;
use crate::stats::{LinkStats, StatsSnapshot};

/// What happened to one received byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxOutcome {
    /// Appended to the line being built
    Stored,
    /// Line buffer full, byte dropped
    Truncated,
    /// Terminator with no pending line
    Ignored,
    /// Line handed to the application
    Committed,
    /// Line completed but the transfer queue was full
    Dropped,
}

/// Receive and transmit state for one serial link
///
/// - `C`: line storage size, lines hold at most `C - 1` bytes
/// - `N`: transfer queue depth in lines
/// - `R`: output ring size in bytes
pub struct Link<M: RawMutex, const C: usize, const N: usize, const R: usize> {
    rx: Mutex<M, RefCell<LineAccumulator<C>>>,
    queue: TransferQueue<M, C, N>,
    tx: TransmitDrainer<M, R>,
    stats: LinkStats,
}

impl<M: RawMutex, const C: usize, const N: usize, const R: usize> Default for Link<M, C, N, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const C: usize, const N: usize, const R: usize> Link<M, C, N, R> {
    /// Create a link with empty buffers and an idle drainer
    pub const fn new() -> Self {
        Self {
            rx: Mutex::new(RefCell::new(LineAccumulator::new())),
            queue: TransferQueue::new(),
            tx: TransmitDrainer::new(),
            stats: LinkStats::new(),
        }
    }

    /// Feed one byte from the receive interrupt
    ///
    /// Never blocks. A completed line is copied into the transfer queue,
    /// or dropped if the queue is full.
    pub fn on_rx_byte(&self, byte: u8) -> RxOutcome {
        self.rx.lock(|acc| match acc.borrow_mut().push(byte) {
            Accumulate::Stored => RxOutcome::Stored,
            Accumulate::Ignored => RxOutcome::Ignored,
            Accumulate::Truncated => {
                self.stats.record_truncated();
                RxOutcome::Truncated
            }
            Accumulate::Complete(bytes) => {
                if self.queue.try_put(Line::from_slice(bytes)) {
                    self.stats.record_committed();
                    RxOutcome::Committed
                } else {
                    self.stats.record_line_dropped();
                    RxOutcome::Dropped
                }
            }
        })
    }

    /// Service a TX-ready event from the transmit interrupt
    pub fn on_tx_ready<U: UartTxFifo + UartTxIrq>(&self, uart: &mut U) -> DrainOutcome {
        let outcome = self.tx.on_tx_ready(uart);
        if let DrainOutcome::Short { pulled, accepted } = outcome {
            self.stats.record_tx_lost(pulled - accepted);
        }
        outcome
    }

    /// Service one transmit interrupt entry
    ///
    /// Repeats [`Link::on_tx_ready`] until the drainer goes Idle or the FIFO
    /// reports no room. Either way the next TX event is accounted for: Idle
    /// waits for a re-arm, a full FIFO will cross its trigger level.
    /// Returns the outcome that ended the entry.
    pub fn on_tx_interrupt<U: UartTxFifo + UartTxIrq>(&self, uart: &mut U) -> DrainOutcome {
        loop {
            match self.on_tx_ready(uart) {
                DrainOutcome::Sent(_) | DrainOutcome::Short { .. } => {}
                outcome => return outcome,
            }
        }
    }

    /// Queue output from the application task, re-arming the drainer
    pub fn submit<I: UartTxIrq + ?Sized>(&self, parts: &[&[u8]], irq: &I) -> Submitted {
        let submitted = self.tx.submit(parts, irq);
        if submitted.dropped() > 0 {
            self.stats.record_tx_dropped(submitted.dropped());
        }
        submitted
    }

    /// Wait for the next received line
    pub async fn next_line(&self) -> Line<C> {
        self.queue.get().await
    }

    /// Lines waiting for the application
    pub fn queue(&self) -> &TransferQueue<M, C, N> {
        &self.queue
    }

    /// Output side of the link
    pub fn drainer(&self) -> &TransmitDrainer<M, R> {
        &self.tx
    }

    /// Current drop counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}
