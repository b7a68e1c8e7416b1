//! Interrupt-driven serial line front end
//!
//! This crate contains everything between the UART interrupt handler and
//! the application loop that does not depend on a specific chip:
//!
//! ```text
//!  RX irq ──▶ LineAccumulator ──▶ TransferQueue ──▶ EchoService
//!                                                      │
//!  TX irq ◀── TransmitDrainer ◀──── SharedRing ◀───────┘
//! ```
//!
//! Two execution contexts share the [`Link`]: the interrupt handler calls
//! [`Link::on_rx_byte`] and [`Link::on_tx_ready`] and never blocks, the
//! single application task waits on [`Link::next_line`] and writes output
//! through [`Link::submit`]. Overload is handled by dropping data and
//! counting the drop in [`LinkStats`], never by back-pressure or retries.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod drainer;
pub mod echo;
pub mod line;
pub mod link;
pub mod queue;
pub mod ring;
pub mod stats;

#[cfg(test)]
mod mock;

pub use drainer::{DrainOutcome, DrainState, Submitted, TransmitDrainer};
pub use echo::{EchoFormat, EchoReport, EchoService};
pub use line::{Accumulate, Line, LineAccumulator};
pub use link::{Link, RxOutcome};
pub use queue::TransferQueue;
pub use ring::{RingBuffer, SharedRing};
pub use stats::{LinkStats, StatsSnapshot};
