//! Host stand-in for an interrupt-driven UART

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::vec::Vec;

use linewire_hal::{TxFifoStatus, UartTxFifo, UartTxIrq};

/// Records what the drain path did to the "hardware"
///
/// The traits are also implemented for `&MockUart`, so one instance can
/// act as the interrupt side and the producer side from two threads.
pub struct MockUart {
    sent: Mutex<Vec<u8>>,
    accept_limit: usize,
    room: AtomicUsize,
    armed: AtomicBool,
    arm_calls: AtomicU32,
    disarm_calls: AtomicU32,
}

impl MockUart {
    pub fn new() -> Self {
        Self::accepting(usize::MAX)
    }

    /// FIFO that only ever takes `limit` bytes per call
    pub fn accepting(limit: usize) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            accept_limit: limit,
            room: AtomicUsize::new(<Self as UartTxFifo>::FIFO_DEPTH),
            armed: AtomicBool::new(false),
            arm_calls: AtomicU32::new(0),
            disarm_calls: AtomicU32::new(0),
        }
    }

    /// Bytes the FIFO accepted, in order
    pub fn sent(&self) -> Vec<u8> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_len(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Free FIFO space reported to the drainer
    pub fn set_room(&self, room: usize) {
        self.room.store(room, Ordering::SeqCst);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    pub fn arm_calls(&self) -> u32 {
        self.arm_calls.load(Ordering::SeqCst)
    }

    pub fn disarm_calls(&self) -> u32 {
        self.disarm_calls.load(Ordering::SeqCst)
    }

    fn fill(&self, data: &[u8]) -> usize {
        let n = data.len().min(self.accept_limit);
        self.sent.lock().unwrap().extend_from_slice(&data[..n]);
        n
    }

    fn set_armed(&self, armed: bool) {
        self.armed.store(armed, Ordering::SeqCst);
        let counter = if armed {
            &self.arm_calls
        } else {
            &self.disarm_calls
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

impl UartTxFifo for MockUart {
    const FIFO_DEPTH: usize = 8;

    fn fifo_room(&self) -> usize {
        self.room.load(Ordering::SeqCst)
    }

    fn fifo_fill(&mut self, data: &[u8]) -> usize {
        self.fill(data)
    }
}

impl UartTxIrq for MockUart {
    fn arm_tx(&self) {
        self.set_armed(true);
    }

    fn disarm_tx(&self) {
        self.set_armed(false);
    }
}

impl UartTxFifo for &MockUart {
    const FIFO_DEPTH: usize = 8;

    fn fifo_room(&self) -> usize {
        self.room.load(Ordering::SeqCst)
    }

    fn fifo_fill(&mut self, data: &[u8]) -> usize {
        self.fill(data)
    }
}

impl UartTxIrq for &MockUart {
    fn arm_tx(&self) {
        self.set_armed(true);
    }

    fn disarm_tx(&self) {
        self.set_armed(false);
    }
}

/// Transmit side of a PL011, cycle by cycle
///
/// A 32-entry FIFO with the TX interrupt at the half-way level. TXRIS is
/// set when the level falls through the trigger and cleared when writes
/// push it back above; masking does not clear it. `arm_tx` pends the
/// interrupt like the NVIC kick on the real part.
pub struct Pl011Tx {
    state: Mutex<Pl011State>,
}

#[derive(Default)]
struct Pl011State {
    fifo: VecDeque<u8>,
    wire: Vec<u8>,
    txris: bool,
    txim: bool,
    pended: bool,
}

impl Pl011Tx {
    pub const DEPTH: usize = 32;
    pub const TRIGGER: usize = 16;

    pub fn new() -> Self {
        Self {
            state: Mutex::new(Pl011State::default()),
        }
    }

    /// Bytes that left the shift register, in order
    pub fn wire(&self) -> Vec<u8> {
        self.state.lock().unwrap().wire.clone()
    }

    pub fn fifo_level(&self) -> usize {
        self.state.lock().unwrap().fifo.len()
    }

    /// Interrupt entry is due: pended, or TXRIS while unmasked
    ///
    /// Clears the pend, as taking the exception does.
    pub fn take_irq(&self) -> bool {
        let mut st = self.state.lock().unwrap();
        let due = st.pended || (st.txim && st.txris);
        st.pended = false;
        due
    }

    /// The handler's gate: armed and the FIFO has known room
    pub fn tx_ready(&self) -> bool {
        let armed = self.state.lock().unwrap().txim;
        armed && self.room() > 0
    }

    /// One byte time on the line
    pub fn shift_out(&self) {
        let mut st = self.state.lock().unwrap();
        if let Some(byte) = st.fifo.pop_front() {
            st.wire.push(byte);
            if st.fifo.len() == Self::TRIGGER {
                st.txris = true;
            }
        }
    }

    fn room(&self) -> usize {
        let st = self.state.lock().unwrap();
        TxFifoStatus {
            empty: st.fifo.is_empty(),
            full: st.fifo.len() == Self::DEPTH,
            at_or_below_trigger: st.txris,
        }
        .room(Self::DEPTH, Self::TRIGGER)
    }
}

impl UartTxFifo for &Pl011Tx {
    const FIFO_DEPTH: usize = Pl011Tx::DEPTH;

    fn fifo_room(&self) -> usize {
        self.room()
    }

    fn fifo_fill(&mut self, data: &[u8]) -> usize {
        let mut st = self.state.lock().unwrap();
        let mut written = 0;
        for &byte in data {
            if st.fifo.len() == Pl011Tx::DEPTH {
                break;
            }
            st.fifo.push_back(byte);
            written += 1;
        }
        if st.fifo.len() > Pl011Tx::TRIGGER {
            st.txris = false;
        }
        written
    }
}

impl UartTxIrq for Pl011Tx {
    fn arm_tx(&self) {
        let mut st = self.state.lock().unwrap();
        st.txim = true;
        st.pended = true;
    }

    fn disarm_tx(&self) {
        self.state.lock().unwrap().txim = false;
    }
}

impl UartTxIrq for &Pl011Tx {
    fn arm_tx(&self) {
        Pl011Tx::arm_tx(self);
    }

    fn disarm_tx(&self) {
        Pl011Tx::disarm_tx(self);
    }
}
