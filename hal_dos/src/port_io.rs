//! Port I/O abstraction for DOS-era PC hardware
//!
//! This module provides a trait-based abstraction for x86 port I/O, allowing
//! both real hardware access and scripted fakes for testing.
//!
//! ## Safety
//!
//! Port I/O operations are inherently unsafe as they directly interact with
//! hardware. Care must be taken to:
//! - Only access valid hardware ports
//! - Not interfere with other system components
//!
//! The `RealPortIo` implementation isolates all unsafe code to two small
//! functions.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Keyboard controller data port
pub const KEYBOARD_DATA_PORT: u16 = 0x60;

/// Master PIC command port
pub const PIC1_COMMAND_PORT: u16 = 0x20;

/// Non-specific end-of-interrupt command
pub const PIC_EOI: u8 = 0x20;

/// Port I/O trait
///
/// Methods take `&self`: the port space is global hardware state, and the
/// keyboard interrupt handler reads ports through a shared reference.
///
/// ## Implementation Notes
///
/// Implementations must guarantee:
/// - `inb` reads a byte from the specified port
/// - `outb` writes a byte to the specified port
/// - Operations complete synchronously before returning
pub trait PortIo: Send + Sync {
    /// Reads a byte from an I/O port
    fn inb(&self, port: u16) -> u8;

    /// Writes a byte to an I/O port
    fn outb(&self, port: u16, value: u8);
}

/// Real hardware port I/O implementation
///
/// Uses x86 `in` and `out` instructions. Only usable with I/O privilege
/// (real mode DOS, a DOS extender, or ring 0).
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[derive(Debug, Default)]
pub struct RealPortIo;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl RealPortIo {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl PortIo for RealPortIo {
    #[inline]
    fn inb(&self, port: u16) -> u8 {
        // SAFETY: The caller picked a port that exists on this machine and
        // holds I/O privilege. `in` touches no memory or stack.
        unsafe {
            let value: u8;
            core::arch::asm!(
                "in al, dx",
                in("dx") port,
                out("al") value,
                options(nomem, nostack, preserves_flags)
            );
            value
        }
    }

    #[inline]
    fn outb(&self, port: u16, value: u8) {
        // SAFETY: As for `inb`; `out` touches no memory or stack.
        unsafe {
            core::arch::asm!(
                "out dx, al",
                in("dx") port,
                in("al") value,
                options(nomem, nostack, preserves_flags)
            );
        }
    }
}

#[derive(Debug, Default)]
struct FakePortState {
    reads: VecDeque<(u16, u8)>,
    writes: Vec<(u16, u8)>,
}

/// Fake port I/O implementation for testing
///
/// Reads are answered from a script in order; writes are captured.
///
/// ## Example
///
/// ```rust
/// use hal_dos::port_io::{FakePortIo, PortIo};
///
/// let io = FakePortIo::new();
/// io.script_read(0x60, 0x1E);
///
/// assert_eq!(io.inb(0x60), 0x1E);
/// io.outb(0x20, 0x20);
///
/// assert_eq!(io.remaining_reads(), 0);
/// assert_eq!(io.writes(), vec![(0x20, 0x20)]);
/// ```
#[derive(Debug, Default)]
pub struct FakePortIo {
    state: Mutex<FakePortState>,
}

impl FakePortIo {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakePortState> {
        // A panicking test thread may poison the lock; the data is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Scripts a read: the next `inb` must target `port` and gets `value`
    pub fn script_read(&self, port: u16, value: u8) {
        self.state().reads.push_back((port, value));
    }

    /// Scripts several reads in order
    pub fn script_reads(&self, reads: &[(u16, u8)]) {
        self.state().reads.extend(reads.iter().copied());
    }

    /// Returns the number of scripted reads remaining
    pub fn remaining_reads(&self) -> usize {
        self.state().reads.len()
    }

    /// Returns a copy of all captured writes
    pub fn writes(&self) -> Vec<(u16, u8)> {
        self.state().writes.clone()
    }

    /// Returns the captured writes to one port
    pub fn writes_to(&self, port: u16) -> Vec<u8> {
        self.state()
            .writes
            .iter()
            .filter(|(p, _)| *p == port)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Clears all captured writes
    pub fn clear_writes(&self) {
        self.state().writes.clear();
    }
}

impl PortIo for FakePortIo {
    fn inb(&self, port: u16) -> u8 {
        let mut state = self.state();
        let Some((expected_port, value)) = state.reads.pop_front() else {
            panic!("FakePortIo: No scripted read for port 0x{:04X}", port);
        };
        if port != expected_port {
            panic!(
                "FakePortIo: Port mismatch: expected 0x{:04X}, got 0x{:04X}",
                expected_port, port
            );
        }
        value
    }

    fn outb(&self, port: u16, value: u8) {
        self.state().writes.push((port, value));
    }
}
