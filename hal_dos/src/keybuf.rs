//! Circular scancode buffer shared by the keyboard interrupt and the pump.
//!
//! Exactly one producer (the interrupt handler) and one consumer (the event
//! pump) touch the buffer. The producer stores slots and the write cursor;
//! the consumer stores the read cursor. Neither ever stores the other's
//! cursor, so no lock is needed.

use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};

/// Buffer capacity in bytes. Must be a power of two.
pub const KEYBUF_SIZE: usize = 256;

/// Cursor wrap mask
pub const KEYBUF_MASK: usize = KEYBUF_SIZE - 1;

/// Fixed-size single-producer single-consumer byte ring
///
/// A full buffer holds `KEYBUF_SIZE - 1` bytes; further pushes are dropped
/// and counted until the consumer catches up.
#[derive(Debug)]
pub struct KeyBuffer {
    slots: [AtomicU8; KEYBUF_SIZE],
    write_pos: AtomicUsize,
    read_pos: AtomicUsize,
    dropped: AtomicU64,
}

impl KeyBuffer {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| AtomicU8::new(0)),
            write_pos: AtomicUsize::new(0),
            read_pos: AtomicUsize::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Appends one byte. Producer side only.
    ///
    /// Returns false (and counts a drop) when the buffer is full.
    #[inline]
    pub fn push(&self, byte: u8) -> bool {
        let write = self.write_pos.load(Ordering::Relaxed);
        let read = self.read_pos.load(Ordering::Acquire);

        let next = (write + 1) & KEYBUF_MASK;
        if next == read {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        self.slots[write].store(byte, Ordering::Relaxed);
        self.write_pos.store(next, Ordering::Release);
        true
    }

    /// Hands every byte written before this call to `f`, oldest first.
    /// Consumer side only.
    ///
    /// The write cursor is sampled once on entry; bytes pushed while
    /// draining wait for the next call. The read cursor is published once,
    /// after the last byte. Returns the number of bytes drained.
    pub fn drain<F: FnMut(u8)>(&self, mut f: F) -> usize {
        let write = self.write_pos.load(Ordering::Acquire);
        let mut read = self.read_pos.load(Ordering::Relaxed);
        let mut count = 0;

        while read != write {
            f(self.slots[read].load(Ordering::Relaxed));
            read = (read + 1) & KEYBUF_MASK;
            count += 1;
        }

        self.read_pos.store(read, Ordering::Release);
        count
    }

    /// Number of bytes waiting to be drained
    pub fn len(&self) -> usize {
        let write = self.write_pos.load(Ordering::Acquire);
        let read = self.read_pos.load(Ordering::Acquire);
        write.wrapping_sub(read) & KEYBUF_MASK
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes rejected because the buffer was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Empties the buffer and zeroes the drop counter.
    ///
    /// Only valid while no producer is installed.
    pub fn reset(&self) {
        self.write_pos.store(0, Ordering::Release);
        self.read_pos.store(0, Ordering::Release);
        self.dropped.store(0, Ordering::Relaxed);
    }
}

impl Default for KeyBuffer {
    fn default() -> Self {
        Self::new()
    }
}
