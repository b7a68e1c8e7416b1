//! Link configuration
//!
//! UART framing and echo strings come from link.toml, validated and turned
//! into constants by build.rs. Buffer sizes are fixed here.

use embassy_rp::interrupt::Priority;
use linewire_core::EchoFormat;
use linewire_hal::uart::{DataBits, Parity, StopBits};
use linewire_hal::UartConfig;

include!(concat!(env!("OUT_DIR"), "/link_config.rs"));

/// Line storage per entry, lines hold at most 31 bytes
pub const LINE_CAPACITY: usize = 32;

/// Lines the transfer queue holds before new ones are dropped
pub const QUEUE_DEPTH: usize = 10;

/// Output ring size in bytes
pub const OUTPUT_RING: usize = 1024;

/// NVIC priority of the UART interrupt
pub const UART_IRQ_PRIORITY: Priority = Priority::P1;
