//! Transmit drainer
//!
//! Moves output from the shared ring into the UART transmit FIFO from
//! the "ready for more output" interrupt.
//!
//! # State machine
//!
//! ```text
//!            submit() wrote >= 1 byte
//!   ┌──────┐ ───────────────────────▶ ┌──────────┐
//!   │ Idle │                          │ Draining │ ◀─┐ on_tx_ready()
//!   └──────┘ ◀─────────────────────── └──────────┘ ──┘ pulled > 0
//!            on_tx_ready() pulled 0
//! ```
//!
//! In `Idle` the TX interrupt is disarmed. The emptiness check that moves
//! the drainer to `Idle` and the producer's write-then-arm check both run
//! inside the ring's critical section, so a write can never land between
//! "ring is empty" and "disarm" and be left behind.

use embassy_sync::blocking_mutex::raw::RawMutex;
use linewire_hal::{UartTxFifo, UartTxIrq};
use portable_atomic::{AtomicBool, Ordering};

use crate::ring::SharedRing;

/// Largest run pulled from the ring per TX-ready event
pub const DRAIN_CHUNK: usize = 32;

/// Whether the TX-ready interrupt is currently armed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrainState {
    /// Ring observed empty, TX interrupt disabled
    Idle,
    /// TX interrupt enabled, ring may hold data
    Draining,
}

/// Result of handing output to the drainer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Submitted {
    /// Bytes the caller asked to send
    pub requested: usize,
    /// Bytes that made it into the ring
    pub written: usize,
    /// This call moved the drainer from Idle to Draining
    pub armed: bool,
}

impl Submitted {
    /// Trailing bytes discarded because the ring was full
    pub fn dropped(&self) -> usize {
        self.requested - self.written
    }
}

/// Result of one TX-ready event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrainOutcome {
    /// Ring was empty; the drainer went Idle
    Idle,
    /// The FIFO had no room, nothing was pulled
    Full,
    /// All pulled bytes went into the FIFO
    Sent(usize),
    /// The FIFO took fewer bytes than pulled, the rest are gone
    Short { pulled: usize, accepted: usize },
}

/// Output ring plus the Idle/Draining state machine that empties it
pub struct TransmitDrainer<M: RawMutex, const R: usize> {
    ring: SharedRing<M, R>,
    draining: AtomicBool,
}

impl<M: RawMutex, const R: usize> Default for TransmitDrainer<M, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const R: usize> TransmitDrainer<M, R> {
    /// Create an idle drainer with an empty ring
    pub const fn new() -> Self {
        Self {
            ring: SharedRing::new(),
            draining: AtomicBool::new(false),
        }
    }

    /// Current state
    pub fn state(&self) -> DrainState {
        if self.draining.load(Ordering::Acquire) {
            DrainState::Draining
        } else {
            DrainState::Idle
        }
    }

    /// Output waiting for the transmitter
    pub fn ring(&self) -> &SharedRing<M, R> {
        &self.ring
    }

    /// Queue the concatenation of `parts` for transmission
    ///
    /// Behaves as a single ring write: parts are stored in order until one
    /// does not fit, and everything after the first cut is dropped. Arms
    /// the TX interrupt if at least one byte was stored while Idle.
    /// Thread context only.
    pub fn submit<I: UartTxIrq + ?Sized>(&self, parts: &[&[u8]], irq: &I) -> Submitted {
        self.ring.with(|ring| {
            let mut requested = 0;
            let mut written = 0;
            let mut cut = false;

            for part in parts {
                requested += part.len();
                if !cut {
                    let n = ring.put(part);
                    written += n;
                    cut = n < part.len();
                }
            }

            let armed = written > 0 && !self.draining.swap(true, Ordering::AcqRel);
            if armed {
                irq.arm_tx();
            }

            Submitted {
                requested,
                written,
                armed,
            }
        })
    }

    /// Handle a TX-ready event
    ///
    /// Pulls at most what the FIFO has room for and pushes it to the
    /// hardware. Bytes the FIFO refuses anyway are not retried.
    /// Interrupt context only.
    pub fn on_tx_ready<U: UartTxFifo + UartTxIrq>(&self, uart: &mut U) -> DrainOutcome {
        let mut chunk = [0u8; DRAIN_CHUNK];
        let limit = uart.fifo_room().min(U::FIFO_DEPTH).min(DRAIN_CHUNK);
        if limit == 0 {
            return DrainOutcome::Full;
        }

        let pulled = self.ring.with(|ring| {
            let n = ring.get(&mut chunk[..limit]);
            if n == 0 {
                self.draining.store(false, Ordering::Release);
                uart.disarm_tx();
            }
            n
        });

        if pulled == 0 {
            return DrainOutcome::Idle;
        }

        let accepted = uart.fifo_fill(&chunk[..pulled]);
        if accepted < pulled {
            DrainOutcome::Short { pulled, accepted }
        } else {
            DrainOutcome::Sent(pulled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockUart;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    type Drainer = TransmitDrainer<CriticalSectionRawMutex, 64>;

    /// Service TX-ready events for as long as the interrupt stays armed
    fn pump(drainer: &Drainer, uart: &mut MockUart) -> usize {
        let mut events = 0;
        while uart.is_armed() {
            drainer.on_tx_ready(uart);
            events += 1;
        }
        events
    }

    #[test]
    fn test_starts_idle() {
        let drainer = Drainer::new();
        assert_eq!(drainer.state(), DrainState::Idle);
        assert!(drainer.ring().is_empty());
    }

    #[test]
    fn test_submit_arms_once() {
        let drainer = Drainer::new();
        let uart = MockUart::new();

        let first = drainer.submit(&[b"abc"], &uart);
        assert!(first.armed);
        assert_eq!(drainer.state(), DrainState::Draining);

        let second = drainer.submit(&[b"def"], &uart);
        assert!(!second.armed);
        assert_eq!(uart.arm_calls(), 1);
    }

    #[test]
    fn test_empty_submit_does_not_arm() {
        let drainer = Drainer::new();
        let uart = MockUart::new();

        let result = drainer.submit(&[b""], &uart);
        assert_eq!(result.written, 0);
        assert!(!result.armed);
        assert_eq!(drainer.state(), DrainState::Idle);
        assert_eq!(uart.arm_calls(), 0);
    }

    #[test]
    fn test_drains_in_fifo_sized_chunks() {
        let drainer = Drainer::new();
        let mut uart = MockUart::new();
        drainer.submit(&[b"0123456789abcdefXYZ"], &uart);

        assert_eq!(drainer.on_tx_ready(&mut uart), DrainOutcome::Sent(8));
        assert_eq!(drainer.on_tx_ready(&mut uart), DrainOutcome::Sent(8));
        assert_eq!(drainer.on_tx_ready(&mut uart), DrainOutcome::Sent(3));
        assert_eq!(drainer.state(), DrainState::Draining);

        assert_eq!(drainer.on_tx_ready(&mut uart), DrainOutcome::Idle);
        assert_eq!(drainer.state(), DrainState::Idle);
        assert!(!uart.is_armed());
        assert_eq!(uart.sent(), b"0123456789abcdefXYZ");
    }

    #[test]
    fn test_idle_until_next_write() {
        let drainer = Drainer::new();
        let mut uart = MockUart::new();

        drainer.submit(&[b"ping"], &uart);
        pump(&drainer, &mut uart);
        assert_eq!(uart.disarm_calls(), 1);

        // Nothing written, nothing re-arms
        drainer.submit(&[], &uart);
        assert!(!uart.is_armed());
        assert_eq!(uart.arm_calls(), 1);

        drainer.submit(&[b"pong"], &uart);
        assert!(uart.is_armed());
        assert_eq!(uart.arm_calls(), 2);

        pump(&drainer, &mut uart);
        assert_eq!(uart.sent(), b"pingpong");
    }

    #[test]
    fn test_parts_written_in_order() {
        let drainer = Drainer::new();
        let mut uart = MockUart::new();

        let result = drainer.submit(&[b"Echo: ", b"hi", b"\r\n"], &uart);
        assert_eq!(result.requested, 10);
        assert_eq!(result.written, 10);
        assert_eq!(result.dropped(), 0);

        pump(&drainer, &mut uart);
        assert_eq!(uart.sent(), b"Echo: hi\r\n");
    }

    #[test]
    fn test_full_ring_cuts_trailing_parts() {
        let drainer = TransmitDrainer::<CriticalSectionRawMutex, 8>::new();
        let mut uart = MockUart::new();

        let result = drainer.submit(&[b"abcde", b"fghij", b"kl"], &uart);
        assert_eq!(result.requested, 12);
        assert_eq!(result.written, 8);
        assert_eq!(result.dropped(), 4);

        while uart.is_armed() {
            drainer.on_tx_ready(&mut uart);
        }
        assert_eq!(uart.sent(), b"abcdefgh");
    }

    #[test]
    fn test_short_fifo_write_loses_bytes() {
        let drainer = Drainer::new();
        let mut uart = MockUart::accepting(5);
        drainer.submit(&[b"0123456789"], &uart);

        assert_eq!(
            drainer.on_tx_ready(&mut uart),
            DrainOutcome::Short {
                pulled: 8,
                accepted: 5
            }
        );
        // Still draining, the lost bytes are not put back
        assert_eq!(drainer.state(), DrainState::Draining);
        assert_eq!(drainer.on_tx_ready(&mut uart), DrainOutcome::Sent(2));
        assert_eq!(drainer.on_tx_ready(&mut uart), DrainOutcome::Idle);
        assert_eq!(uart.sent(), b"0123489");
    }

    #[test]
    fn test_full_fifo_leaves_ring_alone() {
        let drainer = Drainer::new();
        let mut uart = MockUart::new();
        drainer.submit(&[b"abcdef"], &uart);

        uart.set_room(0);
        assert_eq!(drainer.on_tx_ready(&mut uart), DrainOutcome::Full);
        assert_eq!(drainer.state(), DrainState::Draining);
        assert_eq!(drainer.ring().len(), 6);

        uart.set_room(4);
        assert_eq!(drainer.on_tx_ready(&mut uart), DrainOutcome::Sent(4));
        assert_eq!(uart.sent(), b"abcd");
    }

    #[test]
    fn test_concurrent_producer_never_strands_output() {
        let drainer = Drainer::new();
        let uart = MockUart::new();
        let expected: std::vec::Vec<u8> = (0..5_000u32).map(|i| b'a' + (i % 26) as u8).collect();

        std::thread::scope(|s| {
            s.spawn(|| {
                let mut sent = 0;
                while sent < expected.len() {
                    let end = (sent + 11).min(expected.len());
                    sent += drainer.submit(&[&expected[sent..end]], &uart).written;
                }
            });

            // The "interrupt" only fires while armed, like the hardware
            let mut isr = &uart;
            while uart.sent_len() < expected.len() {
                if uart.is_armed() {
                    drainer.on_tx_ready(&mut isr);
                }
            }
        });

        assert_eq!(uart.sent(), expected);
        assert_eq!(drainer.on_tx_ready(&mut &uart), DrainOutcome::Idle);
        assert!(!uart.is_armed());
    }
}
