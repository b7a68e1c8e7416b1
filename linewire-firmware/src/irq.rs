//! UART0 interrupt handler
//!
//! Empties the receive FIFO into the line accumulator on every entry, then
//! keeps the transmit FIFO filled while the TX-ready event is armed and
//! the FIFO has room. Runs to completion without waiting on anything.

use defmt::*;
use embassy_rp::interrupt;
use linewire_core::RxOutcome;
use linewire_hal_rp2040::{PacUart, UartRxFifo};

use crate::link::{LINK, LINK_UART};

#[interrupt]
unsafe fn UART0_IRQ() {
    let mut uart = PacUart::new(LINK_UART);

    while let Some(byte) = uart.fifo_read() {
        if LINK.on_rx_byte(byte) == RxOutcome::Dropped {
            trace!("Transfer queue full, line dropped");
        }
    }
    uart.clear_rx_interrupts();

    if uart.tx_ready() {
        let outcome = LINK.on_tx_interrupt(&mut uart);
        trace!("TX interrupt done: {}", outcome);
    }
}
