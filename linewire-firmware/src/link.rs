//! The link shared between the UART interrupt and the echo loop

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use linewire_core::Link;
use linewire_hal_rp2040::UartId;

use crate::config::{LINE_CAPACITY, OUTPUT_RING, QUEUE_DEPTH};

/// UART carrying the link, must match the handler in `irq`
pub const LINK_UART: UartId = UartId::Uart0;

pub type FirmwareLink = Link<CriticalSectionRawMutex, LINE_CAPACITY, QUEUE_DEPTH, OUTPUT_RING>;

/// Receive/transmit state for the link
pub static LINK: FirmwareLink = Link::new();
