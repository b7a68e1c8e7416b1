//! Echo service, the application side of the link
//!
//! Waits for received lines and answers each one with the line echoed
//! back, followed by a fresh prompt:
//!
//! ```text
//! \r\nEcho: <line>\r\nTell me something and press enter:
//! ```

use embassy_sync::blocking_mutex::raw::RawMutex;
use linewire_hal::UartTxIrq;

use crate::drainer::Submitted;
use crate::line::Line;
use crate::link::Link;

/// Fixed strings framing the echo responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EchoFormat {
    /// Sent once at startup, before the first prompt
    pub greeting: &'static str,
    /// Written before the echoed line
    pub prefix: &'static str,
    /// Written after the echoed line
    pub suffix: &'static str,
    /// Re-prompt closing every response
    pub prompt: &'static str,
}

impl EchoFormat {
    pub const DEFAULT: Self = Self {
        greeting: "Hello! I'm your echo bot.\r\n",
        prefix: "\r\nEcho: ",
        suffix: "\r\n",
        prompt: "Tell me something and press enter: ",
    };
}

impl Default for EchoFormat {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One served line and what happened to its response
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EchoReport<const C: usize> {
    pub line: Line<C>,
    pub response: Submitted,
}

/// Consumer loop over a [`Link`]
///
/// `I` re-arms the transmit interrupt whenever a response lands in an
/// idle output ring.
pub struct EchoService<'a, M: RawMutex, I: UartTxIrq, const C: usize, const N: usize, const R: usize> {
    link: &'a Link<M, C, N, R>,
    irq: I,
    format: EchoFormat,
}

impl<'a, M, I, const C: usize, const N: usize, const R: usize> EchoService<'a, M, I, C, N, R>
where
    M: RawMutex,
    I: UartTxIrq,
{
    pub fn new(link: &'a Link<M, C, N, R>, irq: I, format: EchoFormat) -> Self {
        Self { link, irq, format }
    }

    /// Send the greeting banner and the first prompt
    pub fn greet(&self) -> Submitted {
        self.link.submit(
            &[self.format.greeting.as_bytes(), self.format.prompt.as_bytes()],
            &self.irq,
        )
    }

    /// Queue the response for one line
    pub fn respond(&self, line: &Line<C>) -> Submitted {
        self.link.submit(
            &[
                self.format.prefix.as_bytes(),
                line.as_bytes(),
                self.format.suffix.as_bytes(),
                self.format.prompt.as_bytes(),
            ],
            &self.irq,
        )
    }

    /// Wait for the next line and answer it
    pub async fn serve_one(&self) -> EchoReport<C> {
        let line = self.link.next_line().await;
        let response = self.respond(&line);
        EchoReport { line, response }
    }
}
