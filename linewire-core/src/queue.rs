//! Transfer queue between the receive interrupt and the application task
//!
//! A bounded FIFO of whole lines. The interrupt side only ever uses
//! [`TransferQueue::try_put`], which drops the line when the queue is
//! full. The application side waits on [`TransferQueue::get`] for as long
//! as it takes.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

use crate::line::Line;

/// Bounded queue of `N` lines of up to `C - 1` bytes each
pub struct TransferQueue<M: RawMutex, const C: usize, const N: usize> {
    channel: Channel<M, Line<C>, N>,
}

impl<M: RawMutex, const C: usize, const N: usize> Default for TransferQueue<M, C, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const C: usize, const N: usize> TransferQueue<M, C, N> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue a line without waiting
    ///
    /// Returns `false` and drops `line` if the queue already holds `N`
    /// lines. Safe to call from interrupt context.
    pub fn try_put(&self, line: Line<C>) -> bool {
        self.channel.try_send(line).is_ok()
    }

    /// Wait for the oldest line
    pub async fn get(&self) -> Line<C> {
        self.channel.receive().await
    }

    /// Number of lines waiting
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    /// Check if no lines are waiting
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Maximum number of lines held at once
    pub const fn capacity(&self) -> usize {
        N
    }
}
