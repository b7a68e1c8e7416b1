//! Linewire Hardware Abstraction Layer
//!
//! This crate defines the UART traits the line front end needs from a
//! chip-specific driver. The core logic only ever talks to these traits,
//! so the same framing and drain code runs on the RP2040 and on the host
//! test bench.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  linewire-core (framing, queue, drain)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  linewire-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ linewire-hal- │       │   host mock   │
//! │    rp2040     │       │   (tests)     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartRxFifo`] - Pop received bytes from interrupt context
//! - [`uart::UartTxFifo`] - Push bytes into the transmit FIFO
//! - [`uart::UartTxIrq`] - Arm/disarm the "ready for more output" event

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

// Re-export key traits at crate root for convenience
pub use uart::{ConfigError, TxFifoStatus, UartConfig, UartRxFifo, UartTxFifo, UartTxIrq};
