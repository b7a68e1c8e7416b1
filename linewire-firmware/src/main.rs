//! Linewire - Serial Echo Firmware
//!
//! Main firmware binary for RP2040 boards. Frames bytes from UART0 into
//! lines inside the UART interrupt and echoes every line back from the
//! main task through an interrupt-drained output ring.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::uart::Uart;
use {defmt_rtt as _, panic_probe as _};

use linewire_core::EchoService;
use linewire_hal_rp2040::{to_rp_config, PacUart};

use crate::link::{LINK, LINK_UART};

mod config;
mod irq;
mod link;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Linewire firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let uart_config = match to_rp_config(&config::UART) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Unsupported UART configuration: {}", e);
            panic!("UART configuration rejected");
        }
    };

    // Pin assignment is board-specific (Pico: TX=GPIO0, RX=GPIO1)
    info!("Setting UART to {} baud...", config::UART.baudrate);
    let _uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);

    let pac_uart = PacUart::new(LINK_UART);
    pac_uart.enable_rx_interrupts();
    // SAFETY: the handler only touches LINK, which is a const-initialised static
    unsafe { pac_uart.enable_nvic(config::UART_IRQ_PRIORITY) };
    info!("UART initialized, interrupt enabled");

    let echo = EchoService::new(&LINK, pac_uart, config::ECHO);
    let greeting = echo.greet();
    if greeting.dropped() > 0 {
        warn!("Greeting cut short, {} bytes dropped", greeting.dropped());
    }

    spawner.spawn(tasks::stats_task()).unwrap();
    info!("All tasks spawned, firmware running");

    // The UART driver stays alive in this scope for as long as the loop runs
    loop {
        let report = echo.serve_one().await;
        debug!("Echoing {} byte line", report.line.len());
        if report.response.dropped() > 0 {
            warn!(
                "Output ring full, {} response bytes dropped",
                report.response.dropped()
            );
        }
    }
}
