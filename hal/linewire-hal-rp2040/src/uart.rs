//! PL011 UART access for the line front end
//!
//! RP2040 has two UART peripherals (UART0 and UART1). The embassy-rp
//! blocking driver sets up pins, clocks and framing; after that the
//! interrupt handler works directly on the register block through
//! [`PacUart`].

use embassy_rp::interrupt::{self, InterruptExt, Priority};
use embassy_rp::pac;
use embassy_rp::uart;
use linewire_hal::uart::{DataBits, Parity, StopBits};
use linewire_hal::{ConfigError, TxFifoStatus, UartConfig, UartRxFifo, UartTxFifo, UartTxIrq};

/// PL011 transmit FIFO depth
pub const TX_FIFO_DEPTH: usize = 32;

/// FIFO level at or below which TXRIS is raised (UARTIFLS reset value, 1/2)
pub const TX_TRIGGER_LEVEL: usize = 16;

/// UART peripheral identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartId {
    Uart0,
    Uart1,
}

impl UartId {
    fn regs(self) -> pac::uart::Uart {
        match self {
            UartId::Uart0 => pac::UART0,
            UartId::Uart1 => pac::UART1,
        }
    }

    /// NVIC line of this UART
    pub fn interrupt(self) -> interrupt::Interrupt {
        match self {
            UartId::Uart0 => interrupt::UART0_IRQ,
            UartId::Uart1 => interrupt::UART1_IRQ,
        }
    }
}

/// Build the embassy-rp configuration for a validated [`UartConfig`]
///
/// Rejects anything the PL011 cannot do; the caller treats that as fatal.
pub fn to_rp_config(cfg: &UartConfig) -> Result<uart::Config, ConfigError> {
    cfg.validate()?;

    let mut rp = uart::Config::default();
    rp.baudrate = cfg.baudrate;
    rp.data_bits = match cfg.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
        DataBits::Nine => return Err(ConfigError::UnsupportedDataBits(cfg.data_bits)),
    };
    rp.parity = match cfg.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    rp.stop_bits = match cfg.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    Ok(rp)
}

/// Register-level handle on one UART
///
/// Holds no state of its own, so a copy can live in the interrupt handler
/// while another re-arms the transmitter from thread context. Mask
/// register updates from thread context happen inside the output ring's
/// critical section, which keeps them from interleaving with the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacUart {
    id: UartId,
}

impl PacUart {
    pub const fn new(id: UartId) -> Self {
        Self { id }
    }

    fn regs(&self) -> pac::uart::Uart {
        self.id.regs()
    }

    /// Unmask the receive and receive-timeout interrupts
    pub fn enable_rx_interrupts(&self) {
        self.regs().uartimsc().modify(|w| {
            w.set_rxim(true);
            w.set_rtim(true);
        });
    }

    /// Acknowledge receive interrupts once the FIFO has been emptied
    pub fn clear_rx_interrupts(&self) {
        self.regs().uarticr().write(|w| {
            w.set_rxic(true);
            w.set_rtic(true);
            w.set_oeic(true);
        });
    }

    /// TX-ready event armed and the FIFO has known room
    pub fn tx_ready(&self) -> bool {
        self.regs().uartimsc().read().txim() && self.fifo_room() > 0
    }

    /// Set the NVIC priority and unmask the UART interrupt
    ///
    /// # Safety
    /// The interrupt handler for this UART must be in place, and every
    /// piece of state it touches must be initialised.
    pub unsafe fn enable_nvic(&self, priority: Priority) {
        let irq = self.id.interrupt();
        irq.set_priority(priority);
        irq.enable();
    }
}

impl UartRxFifo for PacUart {
    fn fifo_read(&mut self) -> Option<u8> {
        let r = self.regs();
        if r.uartfr().read().rxfe() {
            None
        } else {
            Some(r.uartdr().read().data())
        }
    }
}

impl UartTxFifo for PacUart {
    const FIFO_DEPTH: usize = TX_FIFO_DEPTH;

    fn fifo_room(&self) -> usize {
        let r = self.regs();
        let flags = r.uartfr().read();
        TxFifoStatus {
            empty: flags.txfe(),
            full: flags.txff(),
            at_or_below_trigger: r.uartris().read().txris(),
        }
        .room(TX_FIFO_DEPTH, TX_TRIGGER_LEVEL)
    }

    fn fifo_fill(&mut self, data: &[u8]) -> usize {
        let r = self.regs();
        let mut written = 0;
        for &byte in data {
            if r.uartfr().read().txff() {
                break;
            }
            r.uartdr().write(|w| w.set_data(byte));
            written += 1;
        }
        written
    }
}

impl UartTxIrq for PacUart {
    fn arm_tx(&self) {
        self.regs().uartimsc().modify(|w| w.set_txim(true));
        // The PL011 only raises TXRIS when the FIFO level crosses the
        // threshold, so a FIFO already at or below it needs a software kick.
        self.id.interrupt().pend();
    }

    // Masking is enough. TXRIS stays latched so it can fire again as soon
    // as the transmitter is re-armed.
    fn disarm_tx(&self) {
        self.regs().uartimsc().modify(|w| w.set_txim(false));
    }
}
