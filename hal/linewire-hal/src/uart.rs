//! UART serial communication abstractions
//!
//! Interrupt-driven UART access as seen from an interrupt handler:
//! bytes are popped from the receive FIFO one at a time, and output is
//! pushed into the transmit FIFO in runs whenever the hardware reports
//! it is ready for more.

/// Receive side of an interrupt-driven UART
pub trait UartRxFifo {
    /// Pop one byte from the receive FIFO
    ///
    /// Returns `None` once the FIFO is empty. Never blocks.
    fn fifo_read(&mut self) -> Option<u8>;
}

/// Transmit FIFO of an interrupt-driven UART
pub trait UartTxFifo {
    /// Largest run the hardware can take in one call
    const FIFO_DEPTH: usize;

    /// Bytes the FIFO is known to take right now
    ///
    /// Hardware without a level readout may under-report.
    fn fifo_room(&self) -> usize {
        Self::FIFO_DEPTH
    }

    /// Push as many leading bytes of `data` as the FIFO will take
    ///
    /// Returns the number of bytes accepted, which may be less than
    /// `data.len()`. Never blocks.
    fn fifo_fill(&mut self, data: &[u8]) -> usize;
}

/// Transmit FIFO flags of a PL011-class UART
///
/// These parts have no FIFO level register, only "empty", "full" and the
/// raw TX interrupt status, which is set when the level falls to the
/// trigger level and cleared once writes push it back above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxFifoStatus {
    pub empty: bool,
    pub full: bool,
    pub at_or_below_trigger: bool,
}

impl TxFifoStatus {
    /// Bytes a FIFO of `depth` entries with TX trigger level `trigger` is
    /// guaranteed to accept
    ///
    /// Any FIFO that is not full takes at least one byte, so a caller that
    /// keeps filling until this reaches 0 always leaves the FIFO either
    /// drained by its own writes or full. A full FIFO will fall through the
    /// trigger level and raise the next TX event.
    pub const fn room(&self, depth: usize, trigger: usize) -> usize {
        if self.empty {
            depth
        } else if self.at_or_below_trigger {
            depth - trigger
        } else if !self.full {
            1
        } else {
            0
        }
    }
}

/// Control over the "transmit ready" interrupt source
///
/// Takes `&self` because the producer side re-arms from thread context
/// while the interrupt handler owns the FIFO.
pub trait UartTxIrq {
    /// Enable the TX-ready event so the drainer gets called
    fn arm_tx(&self);

    /// Disable the TX-ready event
    fn disarm_tx(&self);
}

/// Errors from validating a UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Baud rate outside the supported range
    InvalidBaudrate(u32),
    /// Frame format the peripheral cannot produce
    UnsupportedDataBits(DataBits),
}

/// Lowest baud rate accepted by [`UartConfig::validate`]
pub const MIN_BAUDRATE: u32 = 300;

/// Highest baud rate accepted by [`UartConfig::validate`]
pub const MAX_BAUDRATE: u32 = 921_600;

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// Check the configuration against what a PL011-class UART supports
    ///
    /// A rejected configuration is fatal at startup: the caller must not
    /// bring up the line front end on a half-configured port.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BAUDRATE..=MAX_BAUDRATE).contains(&self.baudrate) {
            return Err(ConfigError::InvalidBaudrate(self.baudrate));
        }
        if self.data_bits == DataBits::Nine {
            return Err(ConfigError::UnsupportedDataBits(self.data_bits));
        }
        Ok(())
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
