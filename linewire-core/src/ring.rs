//! Output ring buffer
//!
//! Holds formatted output until the transmit interrupt drains it.
//! Writes that do not fit are cut: only the leading bytes that fit are
//! stored and the caller learns how many that was.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Fixed-capacity byte FIFO
///
/// Read and write cursors run modulo `2 * R`, so a completely full buffer
/// is distinguishable from an empty one and all `R` bytes are usable.
#[derive(Debug, Clone)]
pub struct RingBuffer<const R: usize> {
    storage: [u8; R],
    read: usize,
    write: usize,
}

impl<const R: usize> Default for RingBuffer<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const R: usize> RingBuffer<R> {
    const VALID_CAPACITY: () = assert!(R > 0, "ring buffer needs a non-zero capacity");

    /// Create an empty buffer
    pub const fn new() -> Self {
        let () = Self::VALID_CAPACITY;
        Self {
            storage: [0; R],
            read: 0,
            write: 0,
        }
    }

    /// Total capacity in bytes
    pub const fn capacity(&self) -> usize {
        R
    }

    /// Bytes waiting to be read
    pub fn len(&self) -> usize {
        (self.write + 2 * R - self.read) % (2 * R)
    }

    /// Bytes that can still be written
    pub fn free(&self) -> usize {
        R - self.len()
    }

    /// Check if there is nothing to read
    pub fn is_empty(&self) -> bool {
        self.read == self.write
    }

    /// Append as many leading bytes of `bytes` as fit
    ///
    /// Returns the number of bytes stored, possibly 0.
    pub fn put(&mut self, bytes: &[u8]) -> usize {
        let count = bytes.len().min(self.free());
        let start = self.write % R;
        let first = count.min(R - start);

        self.storage[start..start + first].copy_from_slice(&bytes[..first]);
        self.storage[..count - first].copy_from_slice(&bytes[first..count]);

        self.write = (self.write + count) % (2 * R);
        count
    }

    /// Remove up to `out.len()` of the oldest bytes into `out`
    ///
    /// Returns the number of bytes copied, 0 when empty.
    pub fn get(&mut self, out: &mut [u8]) -> usize {
        let count = out.len().min(self.len());
        let start = self.read % R;
        let first = count.min(R - start);

        out[..first].copy_from_slice(&self.storage[start..start + first]);
        out[first..count].copy_from_slice(&self.storage[..count - first]);

        self.read = (self.read + count) % (2 * R);
        count
    }
}

/// A [`RingBuffer`] shared between one producer and one consumer context
///
/// Every access runs inside the raw mutex `M`. With
/// `CriticalSectionRawMutex` on a single-core target that means the
/// consuming interrupt is masked while the producer updates the cursors.
pub struct SharedRing<M: RawMutex, const R: usize> {
    inner: Mutex<M, RefCell<RingBuffer<R>>>,
}

impl<M: RawMutex, const R: usize> Default for SharedRing<M, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const R: usize> SharedRing<M, R> {
    /// Create an empty shared buffer
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(RingBuffer::new())),
        }
    }

    /// See [`RingBuffer::put`]
    pub fn put(&self, bytes: &[u8]) -> usize {
        self.with(|ring| ring.put(bytes))
    }

    /// See [`RingBuffer::get`]
    pub fn get(&self, out: &mut [u8]) -> usize {
        self.with(|ring| ring.get(out))
    }

    /// Bytes waiting to be read
    pub fn len(&self) -> usize {
        self.with(|ring| ring.len())
    }

    /// Check if there is nothing to read
    pub fn is_empty(&self) -> bool {
        self.with(|ring| ring.is_empty())
    }

    /// Run `f` with exclusive access to the buffer
    pub(crate) fn with<T>(&self, f: impl FnOnce(&mut RingBuffer<R>) -> T) -> T {
        self.inner.lock(|cell| f(&mut *cell.borrow_mut()))
    }
}
