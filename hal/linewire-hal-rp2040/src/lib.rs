//! RP2040-specific HAL for the linewire firmware
//!
//! This crate provides RP2040-specific implementations of the shared
//! `linewire-hal` traits:
//!
//! - PL011 UART receive/transmit FIFO access from interrupt context
//! - TX-ready interrupt arming through the UART mask register and NVIC
//! - Conversion of `linewire_hal::UartConfig` to the embassy-rp driver
//!   configuration

#![no_std]

pub mod uart;

pub use uart::{to_rp_config, PacUart, UartId};

// Re-export shared traits from linewire-hal for convenience
pub use linewire_hal::{UartRxFifo, UartTxFifo, UartTxIrq};
